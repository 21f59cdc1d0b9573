//! Document transforms.
//!
//! Each transform mutates the parsed document in place and records what it
//! did on the [`Pass`]. The pipeline has already checked that `<head>` and
//! `<body>` exist; a transform that cannot find them does nothing.
//!
//! # Modules
//!
//! - `scripts`: Move deferrable scripts to `<body>`, defer critical ones
//! - `styles`: Preload critical stylesheets
//! - `hints`: Preconnect to an external host the page links to
//! - `monitor`: Insert or rewrite the performance-monitoring snippet
//! - `order`: Keep the load-order script pair in order
//! - `ready`: Move DOMContentLoaded handlers to the end of `<body>`

mod hints;
mod monitor;
mod order;
mod ready;
mod scripts;
mod styles;

pub use hints::Preconnect;
pub use monitor::MonitorSnippet;
pub use order::LoadOrder;
pub use ready::DomReadyScripts;
pub use scripts::ScriptMover;
pub use styles::CriticalCss;

use crate::dom::{Document, Element, Node};
use crate::pipeline::Pass;

/// One step of the pipeline.
pub trait Transform: Send + Sync {
    fn apply(&self, doc: &mut Document, pass: &mut Pass<'_>);
}

/// Insert `node` as the second child of `head`, right after whatever node
/// comes first (text included). An empty `head` gets it as its only child.
fn insert_second(head: &mut Element, node: impl Into<Node>) {
    let at = head.children.len().min(1);
    head.children.insert(at, node.into());
}
