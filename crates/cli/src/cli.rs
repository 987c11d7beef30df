//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::PiiLevel;
use std::path::PathBuf;

/// PII Dispatch - route analytics events to backends by data sensitivity
#[derive(Parser, Debug)]
#[command(
    name = "pii-dispatch",
    author,
    version,
    about = "PII-aware analytics dispatch",
    long_about = "Loads a backend configuration, checks which PII levels each backend may \n\
                  receive, and broadcasts tracked events to every capable backend."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        global = true,
        env = "PII_DISPATCH_VERBOSE"
    )]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "PII_DISPATCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration file
    Validate(ValidateArgs),

    /// Display configured backends and their level policies
    Info(InfoArgs),

    /// Broadcast events from a JSON file to the configured backends
    Emit(EmitArgs),
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "dispatch.toml", env = "PII_DISPATCH_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "dispatch.toml", env = "PII_DISPATCH_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show, per PII level, whether each backend handles, bypasses or denies it
    #[arg(long)]
    pub matrix: bool,
}

/// Arguments for the `emit` command
#[derive(Parser, Debug, Clone)]
pub struct EmitArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "dispatch.toml", env = "PII_DISPATCH_CONFIG")]
    pub config: PathBuf,

    /// JSON file holding an array of events
    #[arg(short, long, env = "PII_DISPATCH_EVENTS")]
    pub events: PathBuf,

    /// Broadcast events through `track_state` instead of `track_event`
    #[arg(long)]
    pub state: bool,

    /// Identify the user (by key) before broadcasting
    #[arg(long)]
    pub user: Option<String>,

    /// PII level of the `--user` data point
    #[arg(long, default_value = "personal_data", requires = "user")]
    pub user_level: PiiLevel,

    /// Set the current screen before broadcasting
    #[arg(long)]
    pub screen: Option<String>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "PII_DISPATCH_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_emit() {
        let cli = Cli::try_parse_from([
            "pii-dispatch",
            "-v",
            "emit",
            "--config",
            "d.toml",
            "--events",
            "e.json",
            "--user",
            "u-42",
            "--user-level",
            "very_sensitive",
            "--state",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Emit(args) => {
                assert!(args.state);
                assert_eq!(args.user.as_deref(), Some("u-42"));
                assert_eq!(args.user_level, PiiLevel::VerySensitive);
                assert_eq!(args.metrics_port, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["pii-dispatch", "-q", "-v", "info"]).is_err());
    }
}
