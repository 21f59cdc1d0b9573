//! `optimize` / `check` commands.
//!
//! Collects every `*.html` file under the input directory and runs the
//! pipeline on each one. Files are independent: a file that fails is left
//! untouched and counted, and never stops the batch.

use std::fmt;
use std::fs;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use jwalk::WalkDir;
use rayon::prelude::*;
use serde_json::json;

use crate::config::TuneConfig;
use crate::logger::ProgressLine;
use crate::pipeline::{ChangeSummary, OptimizeContext, optimize};
use crate::telemetry::{self, Event};
use crate::utils::path::display_relative;
use crate::debug;

const LOCATION: &str = "batch";

/// How the batch treats files on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Rewrite optimized files in place.
    Write,
    /// Dry run: compute everything, write nothing.
    Check,
}

impl Mode {
    const fn module(self) -> &'static str {
        match self {
            Self::Write => "optimize",
            Self::Check => "check",
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub mode: Mode,
    /// Files the pipeline succeeded on.
    pub optimized: usize,
    /// Candidate files found.
    pub total: usize,
    /// Summed changes of successful files.
    pub changes: ChangeSummary,
}

impl BatchReport {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            optimized: 0,
            total: 0,
            changes: ChangeSummary::default(),
        }
    }

    fn record(&mut self, outcome: Option<ChangeSummary>) {
        self.total += 1;
        if let Some(changes) = outcome {
            self.optimized += 1;
            self.changes += changes;
        }
    }
}

impl AddAssign for BatchReport {
    fn add_assign(&mut self, rhs: Self) {
        self.optimized += rhs.optimized;
        self.total += rhs.total;
        self.changes += rhs.changes;
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.mode {
            Mode::Write => "Optimized",
            Mode::Check => "Would optimize",
        };
        write!(f, "{} {}/{} HTML files", verb, self.optimized, self.total)?;
        for (label, count) in self.changes.rows() {
            write!(f, "\n  - {label}: {count}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Batch
// =============================================================================

/// Run the pipeline over `config.input.dir`.
///
/// Fails only when the directory is missing or the config cannot build a
/// pipeline; per-file problems are counted in the report.
pub fn run(config: &TuneConfig, mode: Mode, sequential: bool) -> Result<BatchReport> {
    let sink = telemetry::from_config(&config.telemetry);
    sink.emit(Event::new(LOCATION, "Starting optimization process", json!({})));

    let dir = &config.input.dir;
    if !dir.is_dir() {
        sink.emit(Event::new(
            LOCATION,
            "Docs directory not found",
            json!({ "path": dir.display().to_string() }),
        ));
        bail!("{} does not exist", dir.display());
    }

    let files = collect_html_files(dir);
    sink.emit(Event::new(LOCATION, "Found HTML files", json!({ "count": files.len() })));
    debug!(mode.module(); "found {} HTML files in {}", files.len(), dir.display());

    let ctx = OptimizeContext::new(config, sink.clone())?;
    let report = process_files(&files, dir, &ctx, mode, sequential);

    sink.emit(Event::new(
        LOCATION,
        "Optimization summary",
        json!({
            "optimized": report.optimized,
            "total": report.total,
            "changes": report.changes,
        }),
    ));
    Ok(report)
}

fn process_files(
    files: &[PathBuf],
    root: &Path,
    ctx: &OptimizeContext<'_>,
    mode: Mode,
    sequential: bool,
) -> BatchReport {
    if files.is_empty() {
        return BatchReport::new(mode);
    }

    let progress = ProgressLine::new(mode.module(), &[("html", files.len())]);
    let step = |mut report: BatchReport, path: &PathBuf| {
        report.record(process_file(path, root, ctx, mode));
        progress.inc("html");
        report
    };

    let report = if sequential {
        files.iter().fold(BatchReport::new(mode), step)
    } else {
        files
            .par_iter()
            .fold(|| BatchReport::new(mode), step)
            .reduce(
                || BatchReport::new(mode),
                |mut a, b| {
                    a += b;
                    a
                },
            )
    };

    progress.finish();
    report
}

/// Optimize one file. Returns its changes on success.
fn process_file(
    path: &Path,
    root: &Path,
    ctx: &OptimizeContext<'_>,
    mode: Mode,
) -> Option<ChangeSummary> {
    let label = display_relative(path, root);

    let result = (|| -> Result<Option<ChangeSummary>> {
        let html = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let optimized = match optimize(&html, &path.display().to_string(), ctx) {
            Ok(optimized) => optimized,
            Err(e) => {
                debug!("skip"; "{}: {}", label, e);
                return Ok(None);
            }
        };

        if mode == Mode::Write && optimized.html != html {
            fs::write(path, &optimized.html)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        debug!(mode.module(); "{}", label);
        Ok(Some(optimized.changes))
    })();

    result.unwrap_or_else(|e| {
        debug!("error"; "{:#}", e);
        ctx.telemetry().emit(Event::new(
            LOCATION,
            "Optimization error",
            json!({ "error": format!("{e:#}"), "file": path.display().to_string() }),
        ));
        None
    })
}

/// All `*.html` files under `dir`, in sorted walk order.
fn collect_html_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "html"))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
