//! Logging configuration and subscriber setup

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Logging configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level; `RUST_LOG` takes precedence when set
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Include target module information
    pub target: bool,
}

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// General information
    Info,
    /// Debug information
    Debug,
    /// Very verbose debug information
    Trace,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line format
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON lines for structured logging
    Json,
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Shift the level by `-v` / `-q` counts
    pub fn adjusted(self, verbose: u8, quiet: u8) -> LogLevel {
        const LEVELS: [LogLevel; 5] = [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ];
        let position = LEVELS.iter().position(|l| *l == self).unwrap_or(2) as i32;
        let shifted = (position + verbose as i32 - quiet as i32).clamp(0, 4);
        LEVELS[shifted as usize]
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            target: false,
        }
    }
}

/// Logging system manager
pub struct LoggingSystem {
    config: LoggingConfig,
}

impl Default for LoggingSystem {
    fn default() -> Self {
        Self::new(LoggingConfig::default())
    }
}

impl LoggingSystem {
    /// Create a new logging system with configuration
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Filter built from `RUST_LOG`, falling back to the configured level
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.config.level.as_filter()))
    }

    /// Install the global subscriber; logs go to stderr so stdout stays clean
    /// for `--json` output
    pub fn initialize(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.env_filter())
            .with_target(self.config.target)
            .with_writer(std::io::stderr);

        match self.config.format {
            LogFormat::Pretty => builder.pretty().try_init()?,
            LogFormat::Compact => builder.compact().try_init()?,
            LogFormat::Json => builder.json().try_init()?,
        }

        tracing::debug!(
            level = ?self.config.level,
            format = ?self.config.format,
            "Logging system initialized"
        );
        Ok(())
    }

    /// Log version and platform information
    pub fn log_system_info(&self) {
        tracing::info!("ScreenTrace {}", env!("CARGO_PKG_VERSION"));
        tracing::debug!("Platform: {}", std::env::consts::OS);
    }
}
