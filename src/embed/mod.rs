//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `monitor` - Performance-monitoring snippet injected into `<head>`
//!
//! # Usage
//!
//! ```ignore
//! use embed::monitor::{MONITOR_JS, MonitorVars};
//!
//! let js = MONITOR_JS.render(&MonitorVars::from_config(&config.monitor));
//! ```

mod template;

pub use template::{Template, TemplateVars, js_string};

pub mod monitor {
    use super::{Template, TemplateVars, js_string};
    use crate::config::MonitorConfig;

    /// Variables for monitor.js template.
    pub struct MonitorVars<'a> {
        /// Collector URL the page POSTs timing records to.
        pub endpoint: &'a str,
        pub session_id: &'a str,
        pub run_id: &'a str,
    }

    impl<'a> MonitorVars<'a> {
        pub fn from_config(config: &'a MonitorConfig) -> Self {
            Self {
                endpoint: &config.endpoint,
                session_id: &config.session_id,
                run_id: &config.run_id,
            }
        }
    }

    impl TemplateVars for MonitorVars<'_> {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__HTMLTUNE_ENDPOINT__", &js_string(self.endpoint))
                .replace("__HTMLTUNE_SESSION_ID__", &js_string(self.session_id))
                .replace("__HTMLTUNE_RUN_ID__", &js_string(self.run_id))
        }
    }

    /// Self-invoking timing recorder: start, DOMContentLoaded, each
    /// `script[src]` load, window load and per-resource entries. Transport
    /// failures are swallowed in the page.
    pub const MONITOR_JS: Template<MonitorVars<'static>> =
        Template::new(include_str!("monitor.js"));

}
