//! Configuration section definitions.
//!
//! Each module corresponds to a section in `htmltune.toml`:
//!
//! | Module      | TOML Section    | Purpose                                   |
//! |-------------|-----------------|-------------------------------------------|
//! | `input`     | `[input]`       | Directory scanned for `*.html`            |
//! | `scripts`   | `[scripts]`     | Deferrable / critical scripts, load order |
//! | `styles`    | `[styles]`      | Critical stylesheets to preload           |
//! | `hints`     | `[hints]`       | Preconnect resource hint                  |
//! | `monitor`   | `[monitor]`     | Performance-monitoring snippet            |
//! | `telemetry` | `[telemetry]`   | Diagnostic event sinks                    |

mod hints;
mod input;
mod monitor;
mod scripts;
mod styles;
mod telemetry;

// Re-export section configs
pub use hints::HintsConfig;
pub use input::InputConfig;
pub use monitor::MonitorConfig;
pub use scripts::ScriptsConfig;
pub use styles::StylesConfig;
pub use telemetry::TelemetryConfig;

/// Owned string list from literals.
fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
