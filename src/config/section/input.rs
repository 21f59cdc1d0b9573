//! `[input]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [input]
//! dir = "docs"        # Rendered site, relative to htmltune.toml
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where rendered HTML lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory searched recursively for `*.html` files.
    pub dir: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("docs"),
        }
    }
}
