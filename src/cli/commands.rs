//! Command implementations

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::app::{
    AnalyzeInteractor, AnalyzeRequest, IndexInteractor, IndexRequest, InspectInteractor,
    InspectRequest,
};
use crate::cli::args::{AnalyzeArgs, IndexArgs, InspectArgs};
use crate::config::load_configuration;
use crate::utils::cancel::CancellationToken;

/// Execute the analyze command
pub async fn analyze(args: AnalyzeArgs, cancel: CancellationToken) -> Result<()> {
    info!("Starting analysis");
    info!("Screens: {}", args.screens_dir.display());

    if !args.screens_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Screens directory does not exist: {}",
            args.screens_dir.display()
        ));
    }

    let config = load_configuration(args.config.as_deref(), args.config_layer())
        .context("Failed to load configuration")?;

    let interactor = AnalyzeInteractor::new(config, cancel);
    let report = interactor
        .execute(AnalyzeRequest {
            screens_dir: args.screens_dir,
            videos: args.videos,
        })
        .await
        .context("Analysis failed")?;

    for path in &report.written {
        println!("{}", path.display());
    }
    for skipped in &report.skipped {
        warn!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }

    info!("{}", report.summary());
    Ok(())
}

/// Execute the inspect command
pub async fn inspect(args: InspectArgs) -> Result<()> {
    info!("Inspecting: {}", args.input.display());

    let response = InspectInteractor::new()
        .execute(InspectRequest {
            input: args.input,
            json: args.json,
        })
        .await
        .context("Failed to inspect input file")?;

    println!("{}", response.summary);
    Ok(())
}

/// Execute the index command
pub async fn index(args: IndexArgs, cancel: CancellationToken) -> Result<()> {
    if !args.screens_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Screens directory does not exist: {}",
            args.screens_dir.display()
        ));
    }

    let config = load_configuration(args.config.as_deref(), args.config_layer())
        .context("Failed to load configuration")?;

    let response = IndexInteractor::new(config, cancel)
        .execute(IndexRequest {
            screens_dir: args.screens_dir,
        })
        .await
        .context("Failed to build reference index")?;

    if args.json {
        println!("{}", response.format_as_json()?);
    } else {
        print!("{}", response.format_as_text());
    }
    Ok(())
}
