// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `cronrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cronrun",
    version,
    about = "Run external commands on cron schedules.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the jobs file (TOML).
    ///
    /// Default: `Cronrun.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Cronrun.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CRONRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the job list, but don't schedule anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
