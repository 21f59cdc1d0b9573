//! Performance-monitoring snippet.
//!
//! A page carries at most one timing snippet in `<head>`. When an inline
//! script matching the marker already exists, its identifiers are rewritten
//! in place; otherwise a fresh snippet is inserted after the viewport meta, or as the
//! second child of `<head>` when there is none.

use regex::Regex;
use serde_json::json;

use super::{Transform, insert_second};
use crate::config::{ConfigError, MonitorConfig};
use crate::dom::{Attrs, Document, Element, Node};
use crate::embed::monitor::{MONITOR_JS, MonitorVars};
use crate::pipeline::Pass;

const LOCATION: &str = "pipeline::monitor";

pub struct MonitorSnippet<'a> {
    config: &'a MonitorConfig,
    marker: Regex,
    /// Rendered once, cloned into every page that lacks a snippet.
    snippet: String,
}

impl<'a> MonitorSnippet<'a> {
    pub fn new(config: &'a MonitorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            marker: config.marker()?,
            snippet: MONITOR_JS.render(&MonitorVars::from_config(config)),
        })
    }

    fn is_snippet(&self, e: &Element) -> bool {
        e.is_inline_script() && self.marker.is_match(&e.text_content())
    }

    fn rewrite_existing(&self, head: &mut Element) -> usize {
        let mut rewritten = 0;
        head.walk_mut(&mut |script: &mut Element| {
            if self.is_snippet(script) {
                let source = self.config.rewrite(&script.text_content());
                script.set_text(source);
                rewritten += 1;
            }
        });
        rewritten
    }

    fn insert_new(&self, head: &mut Element) {
        let mut script = Element::new("script", Attrs::new());
        script.push_text(self.snippet.as_str());

        let is_viewport = |e: &Element| e.is("meta") && e.attr("name") == Some("viewport");
        if let Err(nodes) = head.insert_after_first(&is_viewport, vec![Node::from(script)]) {
            for node in nodes.into_iter().rev() {
                insert_second(head, node);
            }
        }
    }
}

impl Transform for MonitorSnippet<'_> {
    fn apply(&self, doc: &mut Document, pass: &mut Pass<'_>) {
        let Some(head) = doc.find_tag_mut("head") else {
            return;
        };

        match self.rewrite_existing(head) {
            0 => {
                self.insert_new(head);
                pass.emit(LOCATION, "Added performance script", json!({}));
            }
            count => {
                pass.emit(
                    LOCATION,
                    "Updated performance script",
                    json!({ "scripts": count }),
                );
            }
        }
    }
}
