//! CLI module for ScreenTrace
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};

pub mod args;
pub mod commands;

pub use args::{AnalyzeArgs, IndexArgs, InspectArgs};

/// ScreenTrace
///
/// Turns usability-test screen recordings into per-screen timing metrics by
/// matching sampled frames against labelled reference screenshots.
#[derive(Parser, Debug)]
#[command(name = "screentrace")]
#[command(about = "Measure how long each screen is shown in a usability-test recording")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (RUST_LOG overrides it)
    #[arg(long, value_enum, default_value = "info", global = true, env = "SCREENTRACE_LOG")]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormat,

    /// More verbose logging; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less verbose logging; repeat for less
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Logging settings after applying `-v` and `-q`
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.adjusted(self.verbose, self.quiet),
            format: self.log_format,
            target: self.verbose > 1,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a timings CSV for each video
    Analyze(args::AnalyzeArgs),
    /// Inspect video file information
    Inspect(args::InspectArgs),
    /// Build the reference index and report descriptor counts
    Index(args::IndexArgs),
}
