//! Configuration management for `htmltune.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── input      # [input]
//! │   ├── scripts    # [scripts]
//! │   ├── styles     # [styles]
//! │   ├── hints      # [hints]
//! │   ├── monitor    # [monitor]
//! │   └── telemetry  # [telemetry]
//! ├── error.rs       # ConfigError
//! ├── util.rs        # URL helpers, config file lookup
//! └── mod.rs         # TuneConfig (this file)
//! ```
//!
//! The config file is optional: without one, the built-in tables (tuned for
//! Quarto output) are used.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{
    HintsConfig, InputConfig, MonitorConfig, ScriptsConfig, StylesConfig, TelemetryConfig,
};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::cli::{Cli, RunArgs};
use crate::utils::path::normalize_path;
use crate::{debug, log};
use util::find_config_file;

/// Config file looked up from the current directory upward.
pub const DEFAULT_CONFIG_NAME: &str = "htmltune.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing htmltune.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TuneConfig {
    /// Absolute path to the config file, empty when running on defaults
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory relative paths in the config resolve against
    #[serde(skip)]
    pub root: PathBuf,

    pub input: InputConfig,
    pub scripts: ScriptsConfig,
    pub styles: StylesConfig,
    pub hints: HintsConfig,
    pub monitor: MonitorConfig,
    pub telemetry: TelemetryConfig,
}

impl TuneConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// An explicit `--config` must exist. Otherwise `htmltune.toml` is
    /// searched upward from cwd and built-in defaults apply when absent.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;

        let config_path = Self::locate(cli.config.as_deref(), &cwd)?;

        let mut config = match &config_path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };

        let root = config_path
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| cwd.clone(), Path::to_path_buf);
        config.config_path = config_path.map(|p| normalize_path(&p)).unwrap_or_default();
        config.finalize(&root, &cwd, cli.command.args());
        config.validate()?;

        match config.config_path.as_os_str().is_empty() {
            true => debug!("config"; "no {} found, using defaults", DEFAULT_CONFIG_NAME),
            false => debug!("config"; "loaded {}", config.config_path.display()),
        }

        Ok(config)
    }

    /// Path of the config file to load, if any.
    ///
    /// An explicit path resolves against `cwd` only; the default name is
    /// searched upward from `cwd`.
    fn locate(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
        match explicit {
            Some(path) => {
                let path = cwd.join(path);
                if !path.is_file() {
                    bail!("config file '{}' not found", path.display());
                }
                Ok(Some(path))
            }
            None => Ok(find_config_file(Path::new(DEFAULT_CONFIG_NAME), cwd)),
        }
    }

    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Resolve paths and apply command-line overrides.
    ///
    /// Paths from the config file resolve against `root`; paths given on the
    /// command line resolve against `cwd`.
    fn finalize(&mut self, root: &Path, cwd: &Path, args: &RunArgs) {
        crate::logger::set_verbose(args.verbose);

        self.root = normalize_path(root);

        self.input.dir = match &args.dir {
            Some(dir) => normalize_path(&cwd.join(dir)),
            None => normalize_path(&self.root.join(&self.input.dir)),
        };

        if let Some(log_file) = self.telemetry.log_file.take() {
            self.telemetry.log_file = Some(self.root.join(log_file));
        }

        Self::update_option(&mut self.telemetry.enable, args.telemetry.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Check every section, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scripts.validate()?;
        self.styles.validate()?;
        self.hints.validate()?;
        self.monitor.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}

/// Parse config from a TOML snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> TuneConfig {
    let (parsed, ignored) = TuneConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
