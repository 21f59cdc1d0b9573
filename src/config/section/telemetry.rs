//! `[telemetry]` section configuration.
//!
//! Diagnostic events are best effort: delivery failures are ignored and
//! never change the optimization result.
//!
//! # Example
//!
//! ```toml
//! [telemetry]
//! enable = true
//! endpoint = "http://127.0.0.1:7242/ingest/site"  # optional HTTP collector
//! log_file = ".cache/htmltune.ndjson"             # optional JSON-lines file
//! timeout_ms = 100
//! hypothesis = "C"
//! run_id = "optimize"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::monitor::DEFAULT_MONITOR_ENDPOINT;
use crate::config::ConfigError;
use crate::config::util::is_http_url;

/// Diagnostic event sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Emit events at all.
    pub enable: bool,

    /// HTTP collector receiving one JSON POST per event. Empty disables it.
    pub endpoint: Option<String>,

    /// File receiving one JSON line per event (relative to htmltune.toml).
    pub log_file: Option<PathBuf>,

    /// Per-request timeout for the HTTP collector.
    pub timeout_ms: u64,

    /// Category id stamped on every event.
    pub hypothesis: String,

    pub session_id: String,

    pub run_id: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enable: false,
            endpoint: Some(DEFAULT_MONITOR_ENDPOINT.to_string()),
            log_file: None,
            timeout_ms: 100,
            hypothesis: "C".to_string(),
            session_id: "debug-session".to_string(),
            run_id: "optimize".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// HTTP collector URL; `endpoint = ""` turns the collector off.
    pub fn collector_endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|e| !e.is_empty())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enable {
            return Ok(());
        }
        if let Some(endpoint) = self.collector_endpoint()
            && !is_http_url(endpoint)
        {
            return Err(ConfigError::invalid(
                "telemetry.endpoint",
                format!("{endpoint:?} is not an http(s) URL"),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "telemetry.timeout_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
