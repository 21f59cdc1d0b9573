//! htmltune - tunes generated static-site HTML for faster page loads.

mod cli;
mod config;
mod dom;
mod embed;
mod logger;
mod pipeline;
mod telemetry;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, optimize::Mode};
use config::TuneConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = TuneConfig::load(&cli)?;
    let mode = if cli.command.writes() { Mode::Write } else { Mode::Check };

    let report = cli::optimize::run(&config, mode, cli.command.args().sequential)?;
    println!("{report}");
    Ok(())
}
