//! DOMContentLoaded handlers go last.

use serde_json::json;

use super::Transform;
use crate::dom::{Document, Element};
use crate::pipeline::Pass;

/// Text marking an inline script as a DOMContentLoaded handler.
const DOM_READY_MARKER: &str = "DOMContentLoaded";

/// Re-appends every inline `<body>` script mentioning `DOMContentLoaded` at
/// the end of `<body>`, keeping their relative order. Attributes are kept.
pub struct DomReadyScripts;

impl Transform for DomReadyScripts {
    fn apply(&self, doc: &mut Document, pass: &mut Pass<'_>) {
        let Some(body) = doc.find_tag_mut("body") else {
            return;
        };
        let scripts = body.detach_all(&|e: &Element| {
            e.is_inline_script() && e.text_content().contains(DOM_READY_MARKER)
        });
        if scripts.is_empty() {
            return;
        }

        let count = scripts.len();
        for script in scripts {
            body.push(script);
            body.push_text("\n");
        }
        pass.emit(
            "pipeline::ready",
            "DOMContentLoaded scripts moved to end",
            json!({ "scripts": count }),
        );
    }
}
