//! Fixed-cadence frame sampling
//!
//! [`FrameSampler`] walks a [`FrameSource`] with a playhead that advances by
//! `1000 / sample_rate` milliseconds per tick and yields the first decodable
//! frame at or after each playhead position. [`FfmpegFrameSource`] is the
//! production source; tests drive the sampler with synthetic sources.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ffmpeg_next as ffmpeg;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling::{Context as Scaler, Flags};
use ffmpeg_next::util::frame::video::Video;
use image::RgbImage;
use tracing::{debug, trace};

use crate::config::sampling_interval_ms;
use crate::engine::progress::ProgressCallback;
use crate::error::{ScreenTraceError, ScreenTraceResult};
use crate::utils::cancel::CancellationToken;

/// Forward decoding is replaced by a container seek past this distance
const SEEK_THRESHOLD_SECONDS: f64 = 5.0;
/// Frames this close before the playhead count as being at the playhead
const TIMESTAMP_EPSILON: f64 = 1e-6;

/// A decoded frame and where it sits in the video
#[derive(Debug, Clone)]
pub struct SampledFrame {
    pub image: RgbImage,
    /// Presentation time in seconds from the start of the video
    pub timestamp_seconds: f64,
    /// Zero-based index of the frame in the stream
    pub frame_index: u64,
}

/// A seekable source of decoded frames
pub trait FrameSource {
    /// Total number of frames in the stream; zero when unknown
    fn total_frames(&self) -> u64;

    /// First decodable frame whose timestamp is at or after `seconds`
    ///
    /// Returns `Ok(None)` once the stream has no such frame. Requests are
    /// made with non-decreasing `seconds`.
    fn frame_at_or_after(&mut self, seconds: f64) -> ScreenTraceResult<Option<SampledFrame>>;
}

/// Lazy, finite iterator over frames taken at a fixed cadence
pub struct FrameSampler<S: FrameSource> {
    source: S,
    interval_ms: f64,
    tick: u64,
    /// Frames consumed so far, as reported to progress
    position: u64,
    finished: bool,
    progress: Arc<dyn ProgressCallback>,
    cancel: CancellationToken,
}

impl<S: FrameSource> FrameSampler<S> {
    /// Sample `source` at `sample_rate` frames per second (must be positive)
    pub fn new(
        source: S,
        sample_rate: u32,
        progress: Arc<dyn ProgressCallback>,
        cancel: CancellationToken,
    ) -> ScreenTraceResult<Self> {
        if sample_rate == 0 {
            return Err(ScreenTraceError::invalid_config(
                "sample_rate must be a positive integer",
            ));
        }

        Ok(Self {
            source,
            interval_ms: sampling_interval_ms(sample_rate),
            tick: 0,
            position: 0,
            finished: false,
            progress,
            cancel,
        })
    }

    /// Milliseconds between consecutive playhead positions
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn total_frames(&self) -> u64 {
        self.source.total_frames()
    }

    /// Current playhead in seconds
    fn playhead_seconds(&self) -> f64 {
        self.tick as f64 * self.interval_ms / 1000.0
    }

    fn fail(&mut self, error: ScreenTraceError) -> Option<ScreenTraceResult<SampledFrame>> {
        self.finished = true;
        Some(Err(error))
    }
}

impl<S: FrameSource> Iterator for FrameSampler<S> {
    type Item = ScreenTraceResult<SampledFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let total = self.source.total_frames();
        if total > 0 && self.position >= total {
            self.finished = true;
            return None;
        }

        if let Err(e) = self.cancel.check() {
            return self.fail(e);
        }

        let playhead = self.playhead_seconds();
        match self.source.frame_at_or_after(playhead) {
            Ok(Some(frame)) => {
                trace!(
                    "Sampled frame {} at {:.3}s (playhead {:.3}s)",
                    frame.frame_index,
                    frame.timestamp_seconds,
                    playhead
                );

                let consumed = frame.frame_index.saturating_add(1);
                let delta = consumed.saturating_sub(self.position);
                if delta > 0 {
                    self.position += delta;
                    self.progress
                        .on_progress(self.position, (total > 0).then_some(total));
                }

                self.tick += 1;
                Some(Ok(frame))
            }
            Ok(None) => {
                debug!("Frame source exhausted at {:.3}s", playhead);
                self.finished = true;
                None
            }
            Err(e) => self.fail(e),
        }
    }
}

/// Frame source backed by an ffmpeg demuxer and decoder
///
/// Both are owned by the source and released when it is dropped.
pub struct FfmpegFrameSource {
    path: PathBuf,
    input: ffmpeg::format::context::Input,
    decoder: ffmpeg::decoder::Video,
    stream_index: usize,
    /// Seconds per stream tick
    time_base: f64,
    /// Stream start offset in ticks
    start_pts: i64,
    fps: f64,
    total_frames: u64,
    scaler: Option<Scaler>,
    current: Option<SampledFrame>,
    draining: bool,
    exhausted: bool,
}

impl FfmpegFrameSource {
    /// Open `path` and prepare a decoder for its best video stream
    pub fn open(path: &Path) -> ScreenTraceResult<Self> {
        let input =
            ffmpeg::format::input(&path).map_err(|e| ScreenTraceError::unreadable(path, e))?;

        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| ScreenTraceError::unreadable(path, "no video stream found"))?;

        let stream_index = stream.index();
        let time_base = f64::from(stream.time_base());
        let fps = stream_fps(&stream);
        let start_pts = match stream.start_time() {
            i64::MIN => 0,
            start => start,
        };

        let total_frames = if stream.frames() > 0 {
            stream.frames() as u64
        } else {
            let duration = if stream.duration() > 0 {
                stream.duration() as f64 * time_base
            } else {
                input.duration().max(0) as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE)
            };
            (duration * fps).round().max(0.0) as u64
        };

        let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|e| ScreenTraceError::unreadable(path, e))?;

        debug!(
            "Opened {}: stream {}, {:.3} fps, {} frames",
            path.display(),
            stream_index,
            fps,
            total_frames
        );

        Ok(Self {
            path: path.to_path_buf(),
            input,
            decoder,
            stream_index,
            time_base,
            start_pts,
            fps,
            total_frames,
            scaler: None,
            current: None,
            draining: false,
            exhausted: false,
        })
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Next decoded frame in presentation order, or `None` at end of stream
    fn decode_next(&mut self) -> ScreenTraceResult<Option<Video>> {
        loop {
            let mut frame = Video::empty();
            match self.decoder.receive_frame(&mut frame) {
                Ok(()) => return Ok(Some(frame)),
                Err(ffmpeg::Error::Eof) => {
                    self.exhausted = true;
                    return Ok(None);
                }
                Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::error::EAGAIN => {}
                Err(e) => return Err(ScreenTraceError::unreadable(&self.path, e)),
            }

            if self.draining {
                self.exhausted = true;
                return Ok(None);
            }

            let mut sent = false;
            while let Some((stream, packet)) = self.input.packets().next() {
                if stream.index() == self.stream_index {
                    self.decoder
                        .send_packet(&packet)
                        .map_err(|e| ScreenTraceError::unreadable(&self.path, e))?;
                    sent = true;
                    break;
                }
            }

            if !sent {
                self.decoder
                    .send_eof()
                    .map_err(|e| ScreenTraceError::unreadable(&self.path, e))?;
                self.draining = true;
            }
        }
    }

    /// Jump close to `seconds` through the container index
    fn seek(&mut self, seconds: f64) -> ScreenTraceResult<()> {
        let offset = self.start_pts as f64 * self.time_base;
        let target = ((seconds + offset) * f64::from(ffmpeg::ffi::AV_TIME_BASE)) as i64;
        debug!("Seeking {} to {:.3}s", self.path.display(), seconds);

        self.input
            .seek(target, ..target)
            .map_err(|e| ScreenTraceError::unreadable(&self.path, e))?;
        self.decoder.flush();
        self.draining = false;
        self.exhausted = false;
        Ok(())
    }

    fn frame_seconds(&self, frame: &Video) -> f64 {
        let pts = frame.timestamp().or_else(|| frame.pts()).unwrap_or(0);
        ((pts - self.start_pts) as f64 * self.time_base).max(0.0)
    }

    fn to_rgb(&mut self, frame: &Video) -> ScreenTraceResult<RgbImage> {
        let (width, height) = (frame.width(), frame.height());

        let stale = self.scaler.as_ref().map_or(true, |scaler| {
            let input = scaler.input();
            input.format != frame.format() || input.width != width || input.height != height
        });
        if stale {
            let scaler = Scaler::get(
                frame.format(),
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                Flags::BILINEAR,
            )
            .map_err(|e| ScreenTraceError::unreadable(&self.path, e))?;
            self.scaler = Some(scaler);
        }

        let mut rgb = Video::empty();
        if let Some(scaler) = self.scaler.as_mut() {
            scaler
                .run(frame, &mut rgb)
                .map_err(|e| ScreenTraceError::unreadable(&self.path, e))?;
        }

        let stride = rgb.stride(0);
        let row_bytes = width as usize * 3;
        let data = rgb.data(0);
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            pixels.extend_from_slice(&data[start..start + row_bytes]);
        }

        RgbImage::from_raw(width, height, pixels).ok_or_else(|| {
            ScreenTraceError::unreadable(&self.path, "decoded frame has an unexpected size")
        })
    }
}

impl FrameSource for FfmpegFrameSource {
    fn total_frames(&self) -> u64 {
        self.total_frames
    }

    fn frame_at_or_after(&mut self, seconds: f64) -> ScreenTraceResult<Option<SampledFrame>> {
        let seconds = seconds.max(0.0);

        if let Some(current) = &self.current {
            if current.timestamp_seconds + TIMESTAMP_EPSILON >= seconds {
                return Ok(Some(current.clone()));
            }
        }

        let last_seconds = self.current.as_ref().map(|c| c.timestamp_seconds);
        if let Some(last_seconds) = last_seconds {
            if seconds - last_seconds > SEEK_THRESHOLD_SECONDS {
                self.seek(seconds)?;
            }
        }

        if self.exhausted {
            return Ok(None);
        }

        while let Some(frame) = self.decode_next()? {
            let timestamp_seconds = self.frame_seconds(&frame);
            if timestamp_seconds + TIMESTAMP_EPSILON < seconds {
                continue;
            }

            let sampled = SampledFrame {
                image: self.to_rgb(&frame)?,
                timestamp_seconds,
                frame_index: (timestamp_seconds * self.fps).round() as u64,
            };
            self.current = Some(sampled.clone());
            return Ok(Some(sampled));
        }

        Ok(None)
    }
}

fn stream_fps(stream: &ffmpeg::format::stream::Stream) -> f64 {
    let average = f64::from(stream.avg_frame_rate());
    if average.is_finite() && average > 0.0 {
        return average;
    }
    let rate = f64::from(stream.rate());
    if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        0.0
    }
}
