//! JSON-lines file sink.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use parking_lot::Mutex;

use super::{Event, Telemetry};

/// Appends one JSON object per line. Write errors are ignored.
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    /// Open `path` for appending, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl Telemetry for FileSink {
    fn emit(&self, event: Event) {
        let Ok(mut line) = serde_json::to_string(&event) else {
            return;
        };
        line.push('\n');
        // One write per line keeps lines whole across threads
        let _ = self.file.lock().write_all(line.as_bytes());
    }
}
