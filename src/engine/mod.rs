//! Video analysis engine
//!
//! The per-video chain is strictly sequential: the [`sampler`] yields frames,
//! the [`classifier`] labels each one, and the [`analyzer`] feeds the labels
//! through the timeline builder and cleaner.

pub mod analyzer;
pub mod classifier;
pub mod progress;
pub mod sampler;

pub use analyzer::VideoAnalyzer;
pub use classifier::{PageClassifier, PageDetector};
pub use progress::{NoOpProgressCallback, ProgressCallback, TracingProgress};
pub use sampler::{FfmpegFrameSource, FrameSampler, FrameSource, SampledFrame};
