//! External script placement.
//!
//! Every `<script src>` inside `<head>` is classified by the file name of
//! its `src` (final `/` segment):
//!
//! - deferrable: detached and re-inserted into `<body>` before the last
//!   inline script (or appended), gaining `defer` when it has neither
//!   `defer` nor `async`
//! - critical: stays in place, gains `defer` the same way
//!
//! A name matches when it contains any configured fragment. Deferrable wins
//! when both lists match.

use serde_json::json;

use super::Transform;
use crate::config::ScriptsConfig;
use crate::dom::{Document, Element, Node};
use crate::pipeline::Pass;
use crate::utils::html::file_name;

const LOCATION: &str = "pipeline::scripts";

/// Moves and defers external scripts found in `<head>`.
pub struct ScriptMover<'a> {
    config: &'a ScriptsConfig,
}

impl<'a> ScriptMover<'a> {
    pub const fn new(config: &'a ScriptsConfig) -> Self {
        Self { config }
    }

    fn matches(fragments: &[String], name: &str) -> bool {
        fragments.iter().any(|f| name.contains(f.as_str()))
    }

    fn is_deferrable(&self, script: &Element) -> bool {
        script.is("script")
            && script
                .attr("src")
                .is_some_and(|src| Self::matches(&self.config.deferrable, file_name(src)))
    }

    fn is_critical(&self, script: &Element) -> bool {
        script.is("script")
            && script
                .attr("src")
                .is_some_and(|src| Self::matches(&self.config.critical, file_name(src)))
    }

    /// Detach deferrable scripts from `<head>` and re-insert them in `<body>`.
    fn move_deferrable(&self, doc: &mut Document, pass: &mut Pass<'_>) {
        let Some(head) = doc.find_tag_mut("head") else {
            return;
        };
        let moved = head.detach_all(&|e: &Element| self.is_deferrable(e));
        if moved.is_empty() {
            return;
        }

        let Some(body) = doc.find_tag_mut("body") else {
            return;
        };
        for mut script in moved {
            let name = script_name(&script);
            if script.is_deferred() {
                pass.emit(LOCATION, "Script moved", json!({ "script": name }));
            } else {
                script.set_attr("defer", "");
                pass.changes.scripts_deferred += 1;
                pass.emit(LOCATION, "Script deferred and moved", json!({ "script": name }));
            }
            pass.changes.scripts_moved += 1;

            let nodes = vec![Node::from(script), Node::text("\n")];
            if let Err(nodes) = body.insert_before_last(&Element::is_inline_script, nodes) {
                body.children.extend(nodes);
            }
        }
    }

    /// Add `defer` to critical scripts still in `<head>`.
    fn defer_critical(&self, doc: &mut Document, pass: &mut Pass<'_>) {
        let Some(head) = doc.find_tag_mut("head") else {
            return;
        };
        let mut deferred = Vec::new();
        head.walk_mut(&mut |script: &mut Element| {
            if self.is_critical(script) && !script.is_deferred() {
                script.set_attr("defer", "");
                deferred.push(script_name(script));
            }
        });

        for name in deferred {
            pass.changes.scripts_deferred += 1;
            pass.emit(LOCATION, "Script deferred in head", json!({ "script": name }));
        }
    }
}

impl Transform for ScriptMover<'_> {
    fn apply(&self, doc: &mut Document, pass: &mut Pass<'_>) {
        self.move_deferrable(doc, pass);
        self.defer_critical(doc, pass);
    }
}

fn script_name(script: &Element) -> String {
    file_name(script.attr("src").unwrap_or_default()).to_string()
}
