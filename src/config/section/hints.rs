//! `[hints]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [hints]
//! preconnect_pattern = 'github\.com'      # regex matched against <a href>
//! preconnect_origin = "https://github.com"  # origin of the inserted hint
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::config::util::url_origin;

/// Resource hint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HintsConfig {
    /// Regex searched in every `<a href>`; a match triggers the preconnect.
    /// Empty disables the hint.
    pub preconnect_pattern: String,

    /// Origin written into `<link rel="preconnect" href=...>`.
    pub preconnect_origin: String,
}

impl Default for HintsConfig {
    fn default() -> Self {
        Self {
            preconnect_pattern: r"github\.com".to_string(),
            preconnect_origin: "https://github.com".to_string(),
        }
    }
}

impl HintsConfig {
    /// Compiled preconnect pattern, `None` when the hint is disabled.
    pub fn pattern(&self) -> Result<Option<Regex>, ConfigError> {
        if self.preconnect_pattern.is_empty() {
            return Ok(None);
        }
        Regex::new(&self.preconnect_pattern)
            .map(Some)
            .map_err(|source| ConfigError::Regex {
                field: "hints.preconnect_pattern",
                source,
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preconnect_pattern.is_empty() {
            return Ok(());
        }
        self.pattern()?;
        match url_origin(&self.preconnect_origin) {
            Some(origin) if origin == self.preconnect_origin => Ok(()),
            Some(origin) => Err(ConfigError::invalid(
                "hints.preconnect_origin",
                format!("expected a bare origin, did you mean {origin:?}?"),
            )),
            None => Err(ConfigError::invalid(
                "hints.preconnect_origin",
                format!("{:?} is not a valid URL origin", self.preconnect_origin),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_hints_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.hints.preconnect_pattern, r"github\.com");
        assert_eq!(config.hints.preconnect_origin, "https://github.com");
        assert!(config.hints.validate().is_ok());
    }

    #[test]
    fn test_hints_config_rejects_path_in_origin() {
        let config =
            test_parse_config("[hints]\npreconnect_origin = \"https://github.com/quarto-dev\"");
        let err = config.hints.validate().unwrap_err().to_string();
        assert!(err.contains("https://github.com"));
    }

    #[test]
    fn test_hints_config_rejects_bad_regex() {
        let config = test_parse_config("[hints]\npreconnect_pattern = \"github(\"");
        assert!(config.hints.pattern().is_err());
        assert!(config.hints.validate().is_err());
    }

    #[test]
    fn test_hints_config_disabled_skips_origin_check() {
        let config =
            test_parse_config("[hints]\npreconnect_pattern = \"\"\npreconnect_origin = \"nope\"");
        assert!(config.hints.validate().is_ok());
    }
}
