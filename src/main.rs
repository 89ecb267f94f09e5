//! ScreenTrace CLI
//!
//! Measures how long each screen of an application is shown in a
//! usability-test recording.
//!
//! # Usage
//!
//! ```bash
//! screentrace analyze screens/ session1.mp4 session2.mp4 --sample-rate 4
//! screentrace index screens/ --json
//! screentrace inspect session1.mp4
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use screentrace::cli::{commands, Cli, Commands};
use screentrace::utils::cancel::CancellationToken;
use screentrace::utils::logging::LoggingSystem;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingSystem::new(cli.logging_config());
    logging
        .initialize()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    logging.log_system_info();

    screentrace::init().context("Failed to initialize FFmpeg")?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after the current frame");
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Commands::Analyze(args) => {
            info!("Executing analyze command");
            commands::analyze(args, cancel).await?;
        }
        Commands::Inspect(args) => {
            info!("Executing inspect command");
            commands::inspect(args).await?;
        }
        Commands::Index(args) => {
            info!("Executing index command");
            commands::index(args, cancel).await?;
        }
    }

    Ok(())
}
