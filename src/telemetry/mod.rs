//! Fire-and-forget diagnostic events.
//!
//! The optimizer reports what each step did through a [`Telemetry`] trait
//! object. Sinks never return errors and never block the caller for long:
//! an unreachable collector or an unwritable log file is silently ignored.
//!
//! # Sinks
//!
//! | Sink            | Delivery                                        |
//! |-----------------|-------------------------------------------------|
//! | `NoopTelemetry` | Discards everything (telemetry disabled)        |
//! | `FileSink`      | One JSON line per event, appended to a file     |
//! | `HttpCollector` | One JSON POST per event from a background thread|
//! | `Fanout`        | Forwards each event to several sinks            |
//!
//! `from_config` assembles the sinks named in `[telemetry]` and stamps the
//! configured session, run and hypothesis ids on every event.

mod file;
mod http;

pub use file::FileSink;
pub use http::HttpCollector;

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

use crate::config::TelemetryConfig;
use crate::log;

// =============================================================================
// Event
// =============================================================================

/// One diagnostic record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Where the event was raised, e.g. `pipeline::scripts`.
    pub location: String,
    pub message: String,
    /// Step-specific context (file, script name, counts).
    pub data: Value,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub session_id: String,
    pub run_id: String,
    pub hypothesis_id: String,
}

impl Event {
    /// New event stamped with the current time; ids are filled in by the sink.
    pub fn new(location: impl Into<String>, message: impl Into<String>, data: Value) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        Self {
            location: location.into(),
            message: message.into(),
            data,
            timestamp,
            session_id: String::new(),
            run_id: String::new(),
            hypothesis_id: String::new(),
        }
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Receiver of diagnostic events. Implementations swallow every failure.
pub trait Telemetry: Send + Sync {
    fn emit(&self, event: Event);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn emit(&self, _event: Event) {}
}

/// Forwards each event to every inner sink, in order.
pub struct Fanout {
    sinks: Vec<Box<dyn Telemetry>>,
}

impl Fanout {
    pub fn new(sinks: Vec<Box<dyn Telemetry>>) -> Self {
        Self { sinks }
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Telemetry for Fanout {
    fn emit(&self, event: Event) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.emit(event.clone());
            }
            last.emit(event);
        }
    }
}

/// Fills in the configured ids before forwarding.
struct Stamped<T> {
    session_id: String,
    run_id: String,
    hypothesis_id: String,
    inner: T,
}

impl<T: Telemetry> Telemetry for Stamped<T> {
    fn emit(&self, mut event: Event) {
        event.session_id.clone_from(&self.session_id);
        event.run_id.clone_from(&self.run_id);
        event.hypothesis_id.clone_from(&self.hypothesis_id);
        self.inner.emit(event);
    }
}

/// Build the sink described by `[telemetry]`.
///
/// Sinks that cannot be set up are reported once and left out; the result
/// is a no-op sink when telemetry is disabled or nothing could be set up.
pub fn from_config(config: &TelemetryConfig) -> Arc<dyn Telemetry> {
    if !config.enable {
        return Arc::new(NoopTelemetry);
    }

    let mut sinks: Vec<Box<dyn Telemetry>> = Vec::new();

    if let Some(path) = &config.log_file {
        match FileSink::open(path) {
            Ok(sink) => sinks.push(Box::new(sink)),
            Err(e) => log!("telemetry"; "log file disabled: {:#}", e),
        }
    }

    if let Some(endpoint) = config.collector_endpoint() {
        let timeout = Duration::from_millis(config.timeout_ms);
        match HttpCollector::spawn(endpoint, timeout) {
            Ok(collector) => sinks.push(Box::new(collector)),
            Err(e) => log!("telemetry"; "collector disabled: {:#}", e),
        }
    }

    let fanout = Fanout::new(sinks);
    if fanout.is_empty() {
        return Arc::new(NoopTelemetry);
    }

    Arc::new(Stamped {
        session_id: config.session_id.clone(),
        run_id: config.run_id.clone(),
        hypothesis_id: config.hypothesis.clone(),
        inner: fanout,
    })
}

// =============================================================================
// Test support
// =============================================================================

/// Sink that keeps every event in memory.
#[cfg(test)]
#[derive(Default)]
pub struct Recorder {
    events: parking_lot::Mutex<Vec<Event>>,
}

#[cfg(test)]
impl Recorder {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Messages of recorded events, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.message.clone()).collect()
    }
}

#[cfg(test)]
impl Telemetry for Recorder {
    fn emit(&self, event: Event) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
impl Telemetry for Arc<Recorder> {
    fn emit(&self, event: Event) {
        self.as_ref().emit(event);
    }
}

// =============================================================================
// Tests
// =============================================================================
