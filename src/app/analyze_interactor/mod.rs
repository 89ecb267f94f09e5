// Analyze interactor - Orchestrates the screens + videos to timings use case

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::app::index_interactor::load_reference_index;
use crate::config::AnalysisConfig;
use crate::engine::{PageClassifier, PageDetector, VideoAnalyzer};
use crate::error::{ScreenTraceError, ScreenTraceResult};
use crate::output::{RunReport, SkippedVideo, TimelineWriter};
use crate::utils::cancel::CancellationToken;
use crate::utils::path::resolve_videos;

/// Interactor for the analyze use case
pub struct AnalyzeInteractor {
    config: Arc<AnalysisConfig>,
    cancel: CancellationToken,
}

impl AnalyzeInteractor {
    pub fn new(config: AnalysisConfig, cancel: CancellationToken) -> Self {
        Self {
            config: Arc::new(config),
            cancel,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Index the reference screens once, then analyse every video
    ///
    /// At most `jobs` videos are decoded at a time. Under the strict policy
    /// the first failure cancels the remaining videos and is returned; under
    /// the lenient policy failed videos are recorded in the report.
    pub async fn execute(&self, request: AnalyzeRequest) -> ScreenTraceResult<RunReport> {
        let videos = resolve_videos(&request.videos, &self.config.video_extensions)?;
        if videos.is_empty() {
            return Err(ScreenTraceError::invalid_config(format!(
                "No videos found (looking for {})",
                self.config.video_extensions
            )));
        }
        info!("Analyzing {} videos with {} workers", videos.len(), self.config.jobs);

        let index = {
            let config = self.config.clone();
            let cancel = self.cancel.clone();
            let screens_dir = request.screens_dir.clone();
            tokio::task::spawn_blocking(move || {
                load_reference_index(&screens_dir, &config, &cancel)
            })
            .await
            .map_err(worker_error)??
        };

        let detector: Arc<dyn PageDetector> = Arc::new(PageClassifier::new(Arc::new(index)));
        let analyzer = VideoAnalyzer::new(detector, &self.config, self.cancel.clone());
        let writer = TimelineWriter::new(&self.config.output_dir, self.config.write_header);

        let report = self
            .run_batch(videos, move |video| {
                let timeline = analyzer.analyze(video)?;
                writer.write(&timeline)
            })
            .await?;

        info!("{}", report.summary());
        Ok(report)
    }

    /// Run `work` for every video on at most `jobs` blocking workers
    ///
    /// Results are handled in completion order. Under the strict policy a
    /// failing worker trips the cancellation token before it releases its
    /// permit, so no queued video starts afterwards.
    async fn run_batch<F>(&self, videos: Vec<PathBuf>, work: F) -> ScreenTraceResult<RunReport>
    where
        F: Fn(&Path) -> ScreenTraceResult<PathBuf> + Send + Sync + 'static,
    {
        let work = Arc::new(work);
        let lenient = self.config.media_policy.is_lenient();
        let semaphore = Arc::new(Semaphore::new(self.config.jobs.max(1)));

        let mut workers = JoinSet::new();
        for video in videos {
            let semaphore = semaphore.clone();
            let cancel = self.cancel.clone();
            let work = work.clone();

            workers.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (video, Err(ScreenTraceError::Cancelled)),
                };
                if let Err(e) = cancel.check() {
                    return (video, Err(e));
                }

                let path = video.clone();
                let result = tokio::task::spawn_blocking(move || (*work)(&path))
                    .await
                    .unwrap_or_else(|e| Err(worker_error(e)));

                if let Err(e) = &result {
                    if !lenient && !matches!(e, ScreenTraceError::Cancelled) {
                        cancel.cancel();
                    }
                }
                (video, result)
            });
        }

        let mut report = RunReport::default();
        let mut first_error: Option<ScreenTraceError> = None;
        while let Some(joined) = workers.join_next().await {
            let (video, result) = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Analysis worker failed: {}", e);
                    self.cancel.cancel();
                    first_error.get_or_insert(worker_error(e));
                    continue;
                }
            };

            match result {
                Ok(path) => report.written.push(path),
                Err(ScreenTraceError::Cancelled) => {
                    debug!("Cancelled {}", video.display());
                    first_error.get_or_insert(ScreenTraceError::Cancelled);
                }
                Err(e) if lenient => {
                    warn!("Skipping {}: {}", video.display(), e);
                    report.skipped.push(SkippedVideo {
                        path: video,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    error!("Failed to analyze {}: {}", video.display(), e);
                    self.cancel.cancel();
                    if matches!(first_error, None | Some(ScreenTraceError::Cancelled)) {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        report.written.sort();
        report.skipped.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(report)
    }
}

fn worker_error(e: tokio::task::JoinError) -> ScreenTraceError {
    ScreenTraceError::WorkerError {
        message: e.to_string(),
    }
}

/// Request for the analyze use case
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    /// Directory of labelled reference screenshots
    pub screens_dir: PathBuf,
    /// Video files, or directories scanned for videos
    pub videos: Vec<PathBuf>,
}
