//! Critical stylesheet preloading.
//!
//! For each `<link rel="stylesheet">` in `<head>` whose `href` contains a
//! critical fragment, a `<link rel="preload" as="style">` for the same
//! `href` is inserted right before it. Hrefs that already have a preload
//! are skipped, so running twice adds nothing.

use rustc_hash::FxHashSet;
use serde_json::json;

use super::Transform;
use crate::config::StylesConfig;
use crate::dom::{Document, Element, Node};
use crate::pipeline::Pass;

const LOCATION: &str = "pipeline::styles";

/// Inserts preload hints for critical stylesheets.
pub struct CriticalCss<'a> {
    config: &'a StylesConfig,
}

impl<'a> CriticalCss<'a> {
    pub const fn new(config: &'a StylesConfig) -> Self {
        Self { config }
    }

    fn critical_href<'e>(&self, link: &'e Element) -> Option<&'e str> {
        if !link.is("link") || !link.has_rel("stylesheet") {
            return None;
        }
        link.attr("href").filter(|href| self.config.is_critical(href))
    }

    /// Walk `nodes`, inserting preloads before matching stylesheets.
    fn preload_in(&self, nodes: &mut Vec<Node>, preloaded: &mut FxHashSet<String>, pass: &mut Pass<'_>) {
        let mut i = 0;
        while i < nodes.len() {
            let Node::Element(link) = &mut nodes[i] else {
                i += 1;
                continue;
            };

            let Some(href) = self.critical_href(link).map(str::to_string) else {
                self.preload_in(&mut link.children, preloaded, pass);
                i += 1;
                continue;
            };

            let high_priority = self.config.is_high_priority(&href);
            if high_priority && !link.has_attr("fetchpriority") {
                link.set_attr("fetchpriority", "high");
            }

            if preloaded.insert(href.clone()) {
                let mut preload = Element::new(
                    "link",
                    [("rel", "preload"), ("href", href.as_str()), ("as", "style")],
                );
                if high_priority {
                    preload.set_attr("fetchpriority", "high");
                }
                nodes.insert(i, preload.into());
                i += 1;

                pass.changes.css_preloaded += 1;
                pass.emit(LOCATION, "CSS preload added", json!({ "css": href }));
            }
            i += 1;
        }
    }
}

impl Transform for CriticalCss<'_> {
    fn apply(&self, doc: &mut Document, pass: &mut Pass<'_>) {
        let Some(head) = doc.find_tag_mut("head") else {
            return;
        };

        let mut preloaded: FxHashSet<String> = head
            .find_all(&|e: &Element| e.is("link") && e.has_rel("preload"))
            .into_iter()
            .filter_map(|e| e.attr("href"))
            .map(str::to_string)
            .collect();

        self.preload_in(&mut head.children, &mut preloaded, pass);
    }
}
