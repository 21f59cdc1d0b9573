//! Load-order correction for a pair of `<head>` scripts.
//!
//! Only direct children of `<head>` are considered. When either script is
//! missing there, or is nested deeper, nothing changes.

use serde_json::json;

use super::Transform;
use crate::dom::{Document, Element};
use crate::pipeline::Pass;

/// Keeps the script whose `src` contains `first` ahead of the one whose
/// `src` contains `second`.
pub struct LoadOrder<'a> {
    first: &'a str,
    second: &'a str,
}

impl<'a> LoadOrder<'a> {
    pub const fn new(first: &'a str, second: &'a str) -> Self {
        Self { first, second }
    }
}

fn src_contains(e: &Element, fragment: &str) -> bool {
    e.is("script") && e.attr("src").is_some_and(|src| src.contains(fragment))
}

impl Transform for LoadOrder<'_> {
    fn apply(&self, doc: &mut Document, pass: &mut Pass<'_>) {
        let Some(head) = doc.find_tag_mut("head") else {
            return;
        };
        let first = head.position(|e| src_contains(e, self.first));
        let second = head.position(|e| src_contains(e, self.second));

        let (Some(first), Some(second)) = (first, second) else {
            return;
        };
        if first < second {
            return;
        }

        // Removing `second` shifts `first` down by one; insert right after it.
        let node = head.children.remove(second);
        head.children.insert(first, node);
        pass.emit(
            "pipeline::order",
            "Load order fixed",
            json!({ "first": self.first, "second": self.second }),
        );
    }
}
