//! HTML optimization pipeline.
//!
//! Turns the HTML text of one document into optimized HTML text plus a
//! summary of what changed. The document is parsed into an owned tree, run
//! through an ordered list of transforms, rendered, and formatted.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ parse → check head/body → transforms (in order) → render   │
//! │                                         → format → output  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transform order matters: later steps rely on what earlier steps left in
//! `<head>` and `<body>`:
//!
//! 1. `ScriptMover`      - move deferrable scripts, defer critical ones
//! 2. `CriticalCss`      - preload critical stylesheets
//! 3. `Preconnect`       - preconnect hint for linked external host
//! 4. `MonitorSnippet`   - insert or rewrite the performance snippet
//! 5. `LoadOrder`        - keep the load-order pair in order
//! 6. `DomReadyScripts`  - move DOMContentLoaded handlers to the end
//!
//! Nothing here touches the filesystem; the batch driver writes the output
//! only when [`optimize`] succeeds.

mod format;
pub mod transform;

#[cfg(test)]
mod tests;

use std::ops::AddAssign;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::{ConfigError, TuneConfig};
use crate::dom::Document;
use crate::telemetry::{Event, Telemetry};

pub use transform::Transform;
use transform::{CriticalCss, DomReadyScripts, LoadOrder, MonitorSnippet, Preconnect, ScriptMover};

// =============================================================================
// Types
// =============================================================================

/// Why a document could not be optimized.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeError {
    #[error("document has no <head> element")]
    MissingHead,
    #[error("document has no <body> element")]
    MissingBody,
}

/// Per-category change counts.
///
/// Reset for every document and summed across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub scripts_deferred: usize,
    pub css_preloaded: usize,
    pub scripts_moved: usize,
    /// 0 or 1 per document.
    pub formatting_improved: usize,
}

impl ChangeSummary {
    /// `(label, count)` rows in report order.
    pub const fn rows(&self) -> [(&'static str, usize); 4] {
        [
            ("Scripts deferred", self.scripts_deferred),
            ("CSS preloaded", self.css_preloaded),
            ("Scripts moved to body", self.scripts_moved),
            ("Formatting improved", self.formatting_improved),
        ]
    }

    fn to_json(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl AddAssign for ChangeSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.scripts_deferred += rhs.scripts_deferred;
        self.css_preloaded += rhs.css_preloaded;
        self.scripts_moved += rhs.scripts_moved;
        self.formatting_improved += rhs.formatting_improved;
    }
}

/// Successful pipeline output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimized {
    pub html: String,
    pub changes: ChangeSummary,
}

// =============================================================================
// Context
// =============================================================================

/// Everything the pipeline needs that outlives one document: the transform
/// chain built from config and the telemetry sink.
///
/// Shared by reference across worker threads.
pub struct OptimizeContext<'a> {
    transforms: Vec<Box<dyn Transform + 'a>>,
    telemetry: Arc<dyn Telemetry>,
}

impl<'a> OptimizeContext<'a> {
    /// Build the transform chain. Disabled features are left out.
    pub fn new(config: &'a TuneConfig, telemetry: Arc<dyn Telemetry>) -> Result<Self, ConfigError> {
        let mut transforms: Vec<Box<dyn Transform + 'a>> = Vec::new();

        transforms.push(Box::new(ScriptMover::new(&config.scripts)));
        transforms.push(Box::new(CriticalCss::new(&config.styles)));
        if let Some(pattern) = config.hints.pattern()? {
            transforms.push(Box::new(Preconnect::new(pattern, &config.hints.preconnect_origin)));
        }
        if config.monitor.enable {
            transforms.push(Box::new(MonitorSnippet::new(&config.monitor)?));
        }
        if let Some((first, second)) = config.scripts.load_order_pair() {
            transforms.push(Box::new(LoadOrder::new(first, second)));
        }
        transforms.push(Box::new(DomReadyScripts));

        Ok(Self {
            transforms,
            telemetry,
        })
    }

    /// Telemetry sink shared with the batch driver.
    pub fn telemetry(&self) -> &dyn Telemetry {
        self.telemetry.as_ref()
    }
}

/// State of one optimization run over one document.
pub struct Pass<'a> {
    /// Label identifying the document in events (usually its path).
    file: &'a str,
    telemetry: &'a dyn Telemetry,
    pub changes: ChangeSummary,
}

impl<'a> Pass<'a> {
    fn new(file: &'a str, telemetry: &'a dyn Telemetry) -> Self {
        Self {
            file,
            telemetry,
            changes: ChangeSummary::default(),
        }
    }

    /// Emit a diagnostic event; `data` gets a `file` entry added.
    pub fn emit(&self, location: &str, message: &str, mut data: Value) {
        match &mut data {
            Value::Object(map) => {
                map.insert("file".into(), Value::from(self.file));
            }
            Value::Null => data = json!({ "file": self.file }),
            _ => data = json!({ "file": self.file, "value": data }),
        }
        self.telemetry.emit(Event::new(location, message, data));
    }
}

// =============================================================================
// Entry point
// =============================================================================

/// Optimize one HTML document.
///
/// `file` labels the document in diagnostic events. On error the caller
/// must leave the original document untouched.
pub fn optimize(html: &str, file: &str, ctx: &OptimizeContext<'_>) -> Result<Optimized, OptimizeError> {
    let mut pass = Pass::new(file, ctx.telemetry());
    pass.emit("pipeline", "Starting HTML optimization", Value::Null);

    let mut doc = Document::parse(html);
    if let Err(err) = check_structure(&doc) {
        pass.emit("pipeline", "Missing head or body", json!({ "error": err.to_string() }));
        return Err(err);
    }

    for transform in &ctx.transforms {
        transform.apply(&mut doc, &mut pass);
    }

    let rendered = doc.render();
    let html = format::separate_scripts(&rendered);
    let formatting_applied = html != rendered;
    if formatting_applied {
        pass.changes.formatting_improved = 1;
    }

    pass.emit(
        "pipeline",
        "Optimization complete",
        json!({
            "changes": pass.changes.to_json(),
            "formatting_applied": formatting_applied,
        }),
    );

    Ok(Optimized {
        html,
        changes: pass.changes,
    })
}

fn check_structure(doc: &Document) -> Result<(), OptimizeError> {
    if doc.find_tag("head").is_none() {
        return Err(OptimizeError::MissingHead);
    }
    if doc.find_tag("body").is_none() {
        return Err(OptimizeError::MissingBody);
    }
    Ok(())
}
