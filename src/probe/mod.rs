//! Media file inspection module

use serde::Serialize;

pub mod inspector;

pub use inspector::VideoInspector;

/// Media file information
#[derive(Debug, Clone, Serialize)]
pub struct MediaInfo {
    /// File path
    pub path: String,
    /// Container format name
    pub container: String,
    /// Duration in seconds
    pub duration: f64,
    /// File size in bytes
    pub file_size: u64,
    /// Best video stream, the one analysis decodes
    pub video: Option<VideoStreamInfo>,
    /// Total number of streams of any kind
    pub stream_count: usize,
}

/// Video stream information
#[derive(Debug, Clone, Serialize)]
pub struct VideoStreamInfo {
    /// Stream index
    pub index: usize,
    /// Codec name
    pub codec: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Average frame rate
    pub frame_rate: f64,
    /// Frame count, from the container or estimated from duration
    pub frame_count: u64,
    /// Time base
    pub time_base: (i32, i32),
}

impl MediaInfo {
    /// Samples analysis would take at `sample_rate`
    pub fn expected_samples(&self, sample_rate: u32) -> u64 {
        if self.duration <= 0.0 {
            return 0;
        }
        (self.duration * sample_rate as f64).ceil() as u64
    }
}
