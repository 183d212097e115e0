//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Vicon Stream - live motion-capture stream distribution arbiter
#[derive(Parser, Debug)]
#[command(
    name = "vicon-stream",
    author,
    version,
    about = "Vicon motion-capture stream distribution arbiter",
    long_about = "Connects to a motion-capture server, polls it for frames on a \n\
                  dedicated worker and fans every new frame out to subscribers.\n\n\
                  The bundled run command drives the arbiter over a simulated \n\
                  capture source; a real SDK-backed client plugs in through the \n\
                  same interface."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "VICON_STREAM_VERBOSE")]
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
        env = "VICON_STREAM_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the arbiter over a simulated capture source
    Run(RunArgs),

    /// Validate a settings file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to settings file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "stream.toml",
        env = "VICON_STREAM_CONFIG"
    )]
    pub config: PathBuf,

    /// Override capture server address from the settings file
    #[arg(long, env = "VICON_HOST")]
    pub host: Option<String>,

    /// Seconds to stream before stopping (0 = until Ctrl-C)
    #[arg(long, default_value = "0", env = "VICON_STREAM_DURATION")]
    pub duration: u64,

    /// Frame rate of the simulated capture source
    #[arg(long, default_value = "100.0", env = "VICON_STREAM_RATE_HZ")]
    pub rate_hz: f64,

    /// Prometheus exporter port (0 = disabled)
    #[arg(long, default_value = "0", env = "VICON_STREAM_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Path to settings file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "stream.toml",
        env = "VICON_STREAM_CONFIG"
    )]
    pub config: PathBuf,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}
