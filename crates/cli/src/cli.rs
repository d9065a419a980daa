//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::{SamplingRate, SensorType};
use std::path::PathBuf;

/// Sensor Logger - per-type batching of motion and environment sensor readings
#[derive(Parser, Debug)]
#[command(
    name = "sensor-logger",
    author,
    version,
    about = "Collect sensor readings into per-type batches",
    long_about = "Registers one listener per sensor type against a sensor platform, \n\
                  routes every reading into the batch of its type, and reports the \n\
                  collected batches when the session ends."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SENSOR_LOGGER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SENSOR_LOGGER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a collection session against the mock platform
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults when omitted
    #[arg(short, long, env = "SENSOR_LOGGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override session length in seconds
    #[arg(short, long, env = "SENSOR_LOGGER_DURATION")]
    pub duration: Option<f64>,

    /// Override the sensor types to collect (comma separated names or codes)
    #[arg(long, value_delimiter = ',')]
    pub sensors: Option<Vec<SensorType>>,

    /// Override the sampling rate hint
    #[arg(long, value_enum, env = "SENSOR_LOGGER_SAMPLING_RATE")]
    pub sampling_rate: Option<RateArg>,

    /// Print batch snapshots as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Validate configuration and exit without collecting
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SENSOR_LOGGER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "session.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "session.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
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

/// Sampling rate hint
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum RateArg {
    Normal,
    Ui,
    Game,
    Fastest,
}

impl From<RateArg> for SamplingRate {
    fn from(rate: RateArg) -> Self {
        match rate {
            RateArg::Normal => Self::Normal,
            RateArg::Ui => Self::Ui,
            RateArg::Game => Self::Game,
            RateArg::Fastest => Self::Fastest,
        }
    }
}
