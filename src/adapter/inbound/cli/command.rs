//! Command-line interface definitions.
//!
//! Defines the CLI structure for crossedge using `clap`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Cross-platform prediction market matching and arbitrage detection
#[derive(Parser, Debug)]
#[command(name = "crossedge")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file [default: ~/.crossedge/config.toml if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or upgrade the database schema
    Migrate,

    /// Load markets, options, prices and matches from a JSON file
    Ingest(IngestArgs),

    /// Propose option matches for every market match
    Match,

    /// Evaluate every option match and record arbitrage opportunities
    Detect(DetectArgs),

    /// Close open markets whose expiration date has passed
    CloseExpired(CloseExpiredArgs),

    /// List recorded arbitrage opportunities
    Opportunities(OpportunitiesArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for `crossedge ingest`.
#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// JSON file with `markets`, `options`, `prices`, `market_matches` and `option_matches`
    pub file: PathBuf,
}

/// Arguments for `crossedge detect`.
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Refresh option matches before evaluating, regardless of config
    #[arg(long)]
    pub rematch: bool,

    /// Skip closing expired markets, regardless of config
    #[arg(long)]
    pub keep_expired: bool,
}

/// Arguments for `crossedge close-expired`.
#[derive(Parser, Debug)]
pub struct CloseExpiredArgs {
    /// Reference date (YYYY-MM-DD) [default: today, UTC]
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

/// Arguments for `crossedge opportunities`.
#[derive(Parser, Debug)]
pub struct OpportunitiesArgs {
    /// Show at most this many, newest first
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Subcommands for `crossedge config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show,
    /// Validate the configuration.
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli =
            Cli::try_parse_from(["crossedge", "detect", "--json", "-vv", "--rematch"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Detect(DetectArgs { rematch: true, .. })));
    }

    #[test]
    fn close_expired_accepts_reference_date() {
        let cli =
            Cli::try_parse_from(["crossedge", "close-expired", "--today", "2024-03-01"]).unwrap();
        let Commands::CloseExpired(args) = cli.command else {
            panic!("expected close-expired");
        };
        assert_eq!(args.today, NaiveDate::from_ymd_opt(2024, 3, 1));
    }
}
