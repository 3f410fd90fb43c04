//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shake Counter - counts shakes of a device from its motion sensor
#[derive(Parser, Debug)]
#[command(
    name = "shake-counter",
    author,
    version,
    about = "Motion sensor shake counter",
    long_about = "Counts shakes from an accelerometer (or gyroscope) reading stream.\n\n\
                  Drives a simulated or replayed sensor through the full lifecycle: \n\
                  capability probe, permission, open, frequency changes and release."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SHAKE_COUNTER_VERBOSE")]
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
        env = "SHAKE_COUNTER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the shake counter
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when absent
    #[arg(short, long, env = "SHAKE_COUNTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Sampling frequency in Hz (overrides configuration)
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(10..=60),
        env = "SHAKE_COUNTER_FREQUENCY"
    )]
    pub frequency: Option<u32>,

    /// Reading source
    #[arg(long, value_enum, default_value = "simulated", env = "SHAKE_COUNTER_SOURCE")]
    pub source: SourceKind,

    /// JSONL recording to replay (required with `--source replay`)
    #[arg(long, required_if_eq("source", "replay"), env = "SHAKE_COUNTER_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier
    #[arg(long, default_value = "1.0")]
    pub replay_speed: f64,

    /// Loop replay when finished
    #[arg(long)]
    pub replay_loop: bool,

    /// Simulated permission answer (overrides `permission.mode`)
    #[arg(long, value_enum, env = "SHAKE_COUNTER_PERMISSION")]
    pub permission: Option<PermissionArg>,

    /// Run duration in seconds (0 = until Ctrl-C or `quit`)
    #[arg(long, default_value = "0", env = "SHAKE_COUNTER_DURATION")]
    pub duration: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SHAKE_COUNTER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; defaults are shown when absent
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Reading source
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceKind {
    /// Synthetic waveform with periodic shake bursts
    #[default]
    Simulated,
    /// JSONL recording
    Replay,
}

/// Simulated permission answer
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionArg {
    Granted,
    Denied,
    Unknown,
    /// No permission API: open directly
    Unavailable,
    /// The permission query itself fails
    Error,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
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
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["shake-counter", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.source, SourceKind::Simulated);
        assert!(args.frequency.is_none());
        assert!(args.permission.is_none());
        assert_eq!(args.duration, 0);
    }

    #[test]
    fn test_frequency_range_enforced() {
        assert!(Cli::try_parse_from(["shake-counter", "run", "--frequency", "9"]).is_err());
        assert!(Cli::try_parse_from(["shake-counter", "run", "--frequency", "61"]).is_err());
        assert!(Cli::try_parse_from(["shake-counter", "run", "--frequency", "60"]).is_ok());
    }

    #[test]
    fn test_replay_requires_path() {
        assert!(Cli::try_parse_from(["shake-counter", "run", "--source", "replay"]).is_err());
        let cli = Cli::try_parse_from([
            "shake-counter",
            "run",
            "--source",
            "replay",
            "--replay",
            "recording.jsonl",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.replay, Some(PathBuf::from("recording.jsonl")));
    }

    #[test]
    fn test_permission_values() {
        let cli =
            Cli::try_parse_from(["shake-counter", "run", "--permission", "unavailable"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.permission, Some(PermissionArg::Unavailable));
    }
}
