//! Video inspection implementation

use std::path::Path;

use ffmpeg_next as ffmpeg;
use tracing::info;

use crate::error::{ScreenTraceError, ScreenTraceResult};
use crate::probe::{MediaInfo, VideoStreamInfo};

/// Video inspector for analyzing media files
#[derive(Debug, Default)]
pub struct VideoInspector;

impl VideoInspector {
    /// Create a new video inspector
    pub fn new() -> Self {
        Self
    }

    /// Inspect a video file
    pub fn inspect(&self, path: &Path) -> ScreenTraceResult<MediaInfo> {
        info!("Inspecting video file: {}", path.display());

        if !path.is_file() {
            return Err(ScreenTraceError::unreadable(path, "file does not exist"));
        }

        let file_size = std::fs::metadata(path)?.len();

        let input = ffmpeg::format::input(&path).map_err(|e| ScreenTraceError::unreadable(path, e))?;

        let container = input.format().name().to_string();
        let duration = if input.duration() > 0 {
            input.duration() as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE)
        } else {
            0.0
        };

        let video = match input.streams().best(ffmpeg::media::Type::Video) {
            Some(stream) => Some(video_stream_info(path, &stream, duration)?),
            None => None,
        };

        let media_info = MediaInfo {
            path: path.display().to_string(),
            container,
            duration,
            file_size,
            video,
            stream_count: input.streams().count(),
        };

        info!("Video inspection completed");
        Ok(media_info)
    }
}

fn video_stream_info(
    path: &Path,
    stream: &ffmpeg::format::stream::Stream,
    container_duration: f64,
) -> ScreenTraceResult<VideoStreamInfo> {
    let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
        .and_then(|context| context.decoder().video())
        .map_err(|e| ScreenTraceError::unreadable(path, e))?;

    let time_base = stream.time_base();
    let frame_rate = f64::from(stream.avg_frame_rate());
    let frame_rate = if frame_rate.is_finite() { frame_rate } else { 0.0 };

    let frame_count = if stream.frames() > 0 {
        stream.frames() as u64
    } else {
        let duration = if stream.duration() > 0 {
            stream.duration() as f64 * f64::from(time_base)
        } else {
            container_duration
        };
        (duration * frame_rate).round().max(0.0) as u64
    };

    Ok(VideoStreamInfo {
        index: stream.index(),
        codec: decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| format!("{:?}", stream.parameters().id())),
        width: decoder.width(),
        height: decoder.height(),
        frame_rate,
        frame_count,
        time_base: (time_base.numerator(), time_base.denominator()),
    })
}

/// Human-readable report for the `inspect` command
pub fn describe(info: &MediaInfo) -> String {
    let mut lines = vec![
        format!("File:       {}", info.path),
        format!("Container:  {}", info.container),
        format!("Duration:   {}", crate::utils::format_seconds(info.duration)),
        format!("Size:       {} bytes", info.file_size),
        format!("Streams:    {}", info.stream_count),
    ];

    match &info.video {
        Some(video) => {
            lines.push(format!("Video:      #{} {}", video.index, video.codec));
            lines.push(format!("Resolution: {}x{}", video.width, video.height));
            lines.push(format!("Frame rate: {:.3} fps", video.frame_rate));
            lines.push(format!("Frames:     {}", video.frame_count));
        }
        None => lines.push("Video:      none".to_string()),
    }

    lines.join("\n")
}
