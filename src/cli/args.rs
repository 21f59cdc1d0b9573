//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Post-build HTML optimizer for static site output
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: htmltune.toml, searched upward)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Optimize every HTML file under the input directory in place
    #[command(visible_alias = "o")]
    Optimize {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Report what would change without writing any file
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        args: RunArgs,
    },
}

impl Commands {
    /// Arguments shared by every subcommand.
    pub const fn args(&self) -> &RunArgs {
        match self {
            Self::Optimize { args } | Self::Check { args } => args,
        }
    }

    /// Whether files are rewritten on disk.
    pub const fn writes(&self) -> bool {
        matches!(self, Self::Optimize { .. })
    }
}

/// Shared arguments for Optimize and Check commands
#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory to scan for HTML files (overrides `[input] dir`)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Process files one at a time instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Emit diagnostic events (overrides `[telemetry] enable`)
    #[arg(short = 'T', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub telemetry: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optimize_with_dir() {
        let cli = Cli::try_parse_from(["htmltune", "optimize", "_site", "-V"]).unwrap();
        assert!(cli.command.writes());
        let args = cli.command.args();
        assert_eq!(args.dir, Some(PathBuf::from("_site")));
        assert!(args.verbose);
        assert_eq!(args.telemetry, None);
    }

    #[test]
    fn test_parse_check_with_global_config() {
        let cli =
            Cli::try_parse_from(["htmltune", "check", "-C", "conf/htmltune.toml"]).unwrap();
        assert!(!cli.command.writes());
        assert_eq!(cli.config, Some(PathBuf::from("conf/htmltune.toml")));
        assert_eq!(cli.command.args().dir, None);
    }

    #[test]
    fn test_parse_telemetry_flag_forms() {
        let cli = Cli::try_parse_from(["htmltune", "o", "--telemetry"]).unwrap();
        assert_eq!(cli.command.args().telemetry, Some(true));

        let cli = Cli::try_parse_from(["htmltune", "o", "--telemetry", "false"]).unwrap();
        assert_eq!(cli.command.args().telemetry, Some(false));
    }
}
