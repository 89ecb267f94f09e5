// Inspect interactor - Orchestrates video inspection use case

use std::path::PathBuf;

use tracing::info;

use crate::error::{ScreenTraceError, ScreenTraceResult};
use crate::probe::inspector::describe;
use crate::probe::{MediaInfo, VideoInspector};

/// Interactor for video inspection use case
#[derive(Debug, Default)]
pub struct InspectInteractor;

impl InspectInteractor {
    pub fn new() -> Self {
        Self
    }

    /// Probe the video on a blocking worker and render the summary
    pub async fn execute(&self, request: InspectRequest) -> ScreenTraceResult<InspectResponse> {
        info!("Starting video inspection for: {}", request.input.display());

        let input = request.input.clone();
        let media_info = tokio::task::spawn_blocking(move || VideoInspector::new().inspect(&input))
            .await
            .map_err(|e| ScreenTraceError::WorkerError {
                message: e.to_string(),
            })??;

        let summary = if request.json {
            serde_json::to_string_pretty(&media_info).map_err(|e| {
                ScreenTraceError::OutputError {
                    message: format!("JSON serialization failed: {}", e),
                }
            })?
        } else {
            describe(&media_info)
        };

        Ok(InspectResponse {
            media_info,
            summary,
        })
    }
}

/// Request for video inspection
#[derive(Debug, Clone)]
pub struct InspectRequest {
    pub input: PathBuf,
    /// Render the summary as JSON
    pub json: bool,
}

/// Response from video inspection
#[derive(Debug, Clone)]
pub struct InspectResponse {
    pub media_info: MediaInfo,
    pub summary: String,
}
