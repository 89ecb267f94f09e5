//! Per-video analysis: sampler, classifier, builder, cleaner

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::domain::model::VideoTimeline;
use crate::domain::timeline::{TimelineBuilder, TimelineCleaner};
use crate::engine::classifier::PageDetector;
use crate::engine::progress::{ProgressCallback, TracingProgress};
use crate::engine::sampler::{FfmpegFrameSource, FrameSampler, FrameSource};
use crate::error::ScreenTraceResult;
use crate::utils::cancel::CancellationToken;
use crate::utils::path::file_stem;

/// Turns one video into its cleaned timeline
#[derive(Clone)]
pub struct VideoAnalyzer {
    detector: Arc<dyn PageDetector>,
    sample_rate: u32,
    feature_cutoff: u32,
    cancel: CancellationToken,
}

impl VideoAnalyzer {
    pub fn new(
        detector: Arc<dyn PageDetector>,
        config: &AnalysisConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            detector,
            sample_rate: config.sample_rate,
            feature_cutoff: config.feature_cutoff,
            cancel,
        }
    }

    /// Decode `path` with ffmpeg and analyse it
    pub fn analyze(&self, path: &Path) -> ScreenTraceResult<VideoTimeline> {
        let video_name = file_stem(path)?;
        info!("Analyzing {}", path.display());

        let source = FfmpegFrameSource::open(path)?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| video_name.clone());
        self.analyze_source(video_name, source, Arc::new(TracingProgress::new(label)))
    }

    /// Analyse frames from any source
    pub fn analyze_source<S: FrameSource>(
        &self,
        video_name: impl Into<String>,
        source: S,
        progress: Arc<dyn ProgressCallback>,
    ) -> ScreenTraceResult<VideoTimeline> {
        let video_name = video_name.into();
        let total = source.total_frames();
        progress.on_start("sampling frames", (total > 0).then_some(total));

        let result = self.run(source, progress.clone());
        match result {
            Ok((sample_count, segments)) => {
                progress.on_complete(&format!(
                    "{} samples reduced to {} segments",
                    sample_count,
                    segments.len()
                ));
                Ok(VideoTimeline {
                    video_name,
                    sample_count,
                    segments,
                })
            }
            Err(e) => {
                progress.on_error(&e.to_string());
                Err(e)
            }
        }
    }

    fn run<S: FrameSource>(
        &self,
        source: S,
        progress: Arc<dyn ProgressCallback>,
    ) -> ScreenTraceResult<(usize, Vec<crate::domain::model::Segment>)> {
        let sampler = FrameSampler::new(source, self.sample_rate, progress, self.cancel.clone())?;
        let mut builder = TimelineBuilder::new(self.feature_cutoff);
        let mut cleaner = TimelineCleaner::new();

        for frame in sampler {
            let frame = frame?;
            let classification = self.detector.detect(&frame.image)?;
            let sample = builder.push(frame.timestamp_seconds, classification);
            debug!(
                "{:.3}s -> {} ({})",
                sample.timestamp_seconds, sample.label, sample.score
            );
            cleaner.push(sample);
        }

        let segments = cleaner.finish()?;
        Ok((builder.len(), segments))
    }
}
