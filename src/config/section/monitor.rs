//! `[monitor]` section configuration.
//!
//! Controls the inline performance-monitoring script kept in `<head>`.
//!
//! # Example
//!
//! ```toml
//! [monitor]
//! enable = true
//! marker = 'performance\.now'          # regex identifying an existing snippet
//! endpoint = "http://127.0.0.1:7242/ingest/site"
//! session_id = "debug-session"
//! run_id = "optimized"
//! replacements = [["runId:'baseline'", "runId:'optimized'"]]
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::config::util::is_http_url;

/// Collector the monitoring snippet reports to by default.
pub const DEFAULT_MONITOR_ENDPOINT: &str =
    "http://127.0.0.1:7242/ingest/0d8a3ffb-db0f-4d0d-bb77-1686141c3976";

/// Performance-monitoring snippet settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Insert or rewrite the snippet.
    pub enable: bool,

    /// Regex matched against inline `<head>` scripts to find an existing snippet.
    pub marker: String,

    /// Collector URL the page reports to.
    pub endpoint: String,

    pub session_id: String,

    /// Run id written into a freshly inserted snippet.
    pub run_id: String,

    /// Literal `(from, to)` rewrites applied to an existing snippet, in order.
    pub replacements: Vec<(String, String)>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let pairs = [
            ("runId:'baseline'", "runId:'optimized'"),
            ("runId:\"baseline\"", "runId:\"optimized\""),
            ("hypothesisId:'A'", "hypothesisId:'D'"),
            ("hypothesisId:\"A\"", "hypothesisId:\"D\""),
            ("hypothesisId:'B'", "hypothesisId:'E'"),
            ("hypothesisId:\"B\"", "hypothesisId:\"E\""),
        ];
        Self {
            enable: true,
            marker: r"performance\.now".to_string(),
            endpoint: DEFAULT_MONITOR_ENDPOINT.to_string(),
            session_id: "debug-session".to_string(),
            run_id: "optimized".to_string(),
            replacements: pairs
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect(),
        }
    }
}

impl MonitorConfig {
    /// Compiled snippet marker.
    pub fn marker(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.marker).map_err(|source| ConfigError::Regex {
            field: "monitor.marker",
            source,
        })
    }

    /// Apply the configured rewrites to snippet source.
    pub fn rewrite(&self, source: &str) -> String {
        self.replacements
            .iter()
            .fold(source.to_string(), |acc, (from, to)| acc.replace(from, to))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enable {
            return Ok(());
        }
        if self.marker.is_empty() {
            return Err(ConfigError::invalid("monitor.marker", "must not be empty"));
        }
        self.marker()?;
        if !is_http_url(&self.endpoint) {
            return Err(ConfigError::invalid(
                "monitor.endpoint",
                format!("{:?} is not an http(s) URL", self.endpoint),
            ));
        }
        if let Some((from, _)) = self.replacements.iter().find(|(from, _)| from.is_empty()) {
            return Err(ConfigError::invalid(
                "monitor.replacements",
                format!("empty pattern {from:?}"),
            ));
        }
        Ok(())
    }
}
