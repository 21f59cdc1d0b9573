//! `[scripts]` section configuration.
//!
//! Script classification is by substring: a fragment matches when it occurs
//! anywhere in the final path segment of the script's `src`.
//!
//! # Example
//!
//! ```toml
//! [scripts]
//! deferrable = ["quarto-nav.js", "clipboard.min.js"]  # moved to end of <body>
//! critical = ["quarto.js", "bootstrap.min.js"]        # deferred in place
//! load_order = ["quarto.js", "bootstrap.min.js"]      # first must precede second
//! ```

use serde::{Deserialize, Serialize};

use super::strings;
use crate::config::ConfigError;

/// Script handling tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Non-critical scripts, safe to move to the end of `<body>`.
    pub deferrable: Vec<String>,

    /// Order-sensitive scripts that stay in `<head>` but may load deferred.
    pub critical: Vec<String>,

    /// Two `src` fragments; the first script must precede the second in `<head>`.
    pub load_order: Vec<String>,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            deferrable: strings(&[
                "quarto-nav.js",
                "headroom.min.js",
                "clipboard.min.js",
                "autocomplete.umd.js",
                "fuse.min.js",
                "quarto-search.js",
                "popper.min.js",
                "tippy.umd.min.js",
                "anchor.min.js",
                "list.min.js",
                "quarto-listing.js",
            ]),
            critical: strings(&["quarto.js", "bootstrap.min.js"]),
            load_order: strings(&["quarto.js", "bootstrap.min.js"]),
        }
    }
}

impl ScriptsConfig {
    /// `(first, second)` of the load-order pair.
    pub fn load_order_pair(&self) -> Option<(&str, &str)> {
        match self.load_order.as_slice() {
            [first, second] => Some((first, second)),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.load_order.is_empty() && self.load_order_pair().is_none() {
            return Err(ConfigError::invalid(
                "scripts.load_order",
                format!(
                    "expected exactly two entries (or none), got {}",
                    self.load_order.len()
                ),
            ));
        }
        if let Some(empty) = self
            .deferrable
            .iter()
            .chain(&self.critical)
            .find(|s| s.is_empty())
        {
            return Err(ConfigError::invalid(
                "scripts",
                format!("empty fragment {empty:?} would match every script"),
            ));
        }
        Ok(())
    }
}
