//! `[styles]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [styles]
//! critical = ["bootstrap.min.css", "bootstrap-icons.css"]  # get a preload hint
//! high_priority = "bootstrap.min.css"                       # also fetchpriority=high
//! ```

use serde::{Deserialize, Serialize};

use super::strings;
use crate::config::ConfigError;

/// Critical stylesheet tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// `href` fragments of stylesheets worth preloading.
    pub critical: Vec<String>,

    /// `href` fragment of the stylesheet fetched with `fetchpriority="high"`.
    /// Empty disables the priority hint.
    pub high_priority: String,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            critical: strings(&[
                "bootstrap.min.css",
                "bootstrap-icons.css",
                "quarto-syntax-highlighting-dark.css",
            ]),
            high_priority: "bootstrap.min.css".to_string(),
        }
    }
}

impl StylesConfig {
    /// Whether `href` names a critical stylesheet.
    pub fn is_critical(&self, href: &str) -> bool {
        self.critical.iter().any(|css| href.contains(css.as_str()))
    }

    /// Whether `href` names the highest-priority stylesheet.
    pub fn is_high_priority(&self, href: &str) -> bool {
        !self.high_priority.is_empty() && href.contains(self.high_priority.as_str())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.critical.iter().any(String::is_empty) {
            return Err(ConfigError::invalid(
                "styles.critical",
                "empty fragment would match every stylesheet",
            ));
        }
        Ok(())
    }
}
