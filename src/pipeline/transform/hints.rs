//! Preconnect resource hint.

use regex::Regex;
use serde_json::json;

use super::{Transform, insert_second};
use crate::dom::{Document, Element};
use crate::pipeline::Pass;

/// Adds `<link rel="preconnect">` to `<head>` when any `<a href>` in the
/// document matches the host pattern and no preconnect to the origin exists.
pub struct Preconnect<'a> {
    pattern: Regex,
    origin: &'a str,
}

impl<'a> Preconnect<'a> {
    pub const fn new(pattern: Regex, origin: &'a str) -> Self {
        Self { pattern, origin }
    }

    fn links_to_host(&self, doc: &Document) -> bool {
        let is_match = |e: &Element| {
            e.is("a")
                && e.attr("href")
                    .is_some_and(|href| self.pattern.is_match(href))
        };
        !doc.find_all(&is_match).is_empty()
    }
}

impl Transform for Preconnect<'_> {
    fn apply(&self, doc: &mut Document, pass: &mut Pass<'_>) {
        if !self.links_to_host(doc) {
            return;
        }
        let Some(head) = doc.find_tag_mut("head") else {
            return;
        };

        let already = head
            .find_all(&|e: &Element| e.is("link") && e.has_rel("preconnect"))
            .iter()
            .any(|e| e.attr("href") == Some(self.origin));
        if already {
            return;
        }

        let link = Element::new("link", [("rel", "preconnect"), ("href", self.origin)]);
        insert_second(head, link);
        pass.emit(
            "pipeline::hints",
            "Preconnect added",
            json!({ "origin": self.origin }),
        );
    }
}
