//! ScreenTrace Library
//!
//! Turns usability-test screen recordings into per-screen timing metrics.
//! Frames are sampled at a fixed rate, matched against labelled reference
//! screenshots by binary feature matching, and folded into a timeline of
//! screen visits that is written as `timings-<video>.csv`.

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod features;
pub mod output;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use config::{AnalysisConfig, MediaPolicy};
pub use domain::model::{Classification, PageLabel, Sample, Segment, VideoTimeline};
pub use engine::{PageClassifier, VideoAnalyzer};
pub use error::{ScreenTraceError, ScreenTraceResult};
pub use features::{FeatureExtractor, ReferenceIndex};
pub use output::TimelineWriter;

/// Initialize ScreenTrace library
pub fn init() -> ScreenTraceResult<()> {
    ffmpeg_next::init()?;
    Ok(())
}
