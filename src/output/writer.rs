//! Timings CSV writer

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::domain::model::{Segment, VideoTimeline};
use crate::error::{ScreenTraceError, ScreenTraceResult};
use crate::utils::path::output_file_name;

/// Header row of every timings file
pub const CSV_HEADER: [&str; 3] = [
    "Screen_Title",
    "Time_Taken_(Seconds)",
    "Cumulative_Time_(Seconds)",
];

/// Writes one `timings-<video>.csv` per timeline
#[derive(Debug, Clone)]
pub struct TimelineWriter {
    output_dir: PathBuf,
    write_header: bool,
}

impl TimelineWriter {
    pub fn new(output_dir: impl Into<PathBuf>, write_header: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            write_header,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Destination of the timings file for `video_name`
    pub fn output_path(&self, video_name: &str) -> PathBuf {
        self.output_dir.join(output_file_name(video_name))
    }

    /// Write the timeline atomically and return the file path
    ///
    /// Rows go to a temporary file in the output directory which is renamed
    /// over the destination once complete.
    pub fn write(&self, timeline: &VideoTimeline) -> ScreenTraceResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| ScreenTraceError::OutputError {
            message: format!(
                "Failed to create output directory {}: {}",
                self.output_dir.display(),
                e
            ),
        })?;

        let path = self.output_path(&timeline.video_name);
        let content = render_csv(&timeline.segments, self.write_header);

        let output_error = |e: std::io::Error| ScreenTraceError::OutputError {
            message: format!("Failed to write {}: {}", path.display(), e),
        };

        let mut temp = NamedTempFile::new_in(&self.output_dir).map_err(output_error)?;
        temp.write_all(content.as_bytes()).map_err(output_error)?;
        temp.as_file().sync_all().map_err(output_error)?;
        temp.persist(&path).map_err(|e| output_error(e.error))?;

        info!(
            "Wrote {} segments for '{}' to {}",
            timeline.segments.len(),
            timeline.video_name,
            path.display()
        );
        Ok(path)
    }
}

/// CSV document for `segments`, one row per segment
pub fn render_csv(segments: &[Segment], write_header: bool) -> String {
    let mut out = String::new();
    if write_header {
        out.push_str(&CSV_HEADER.join(","));
        out.push('\n');
    }
    for segment in segments {
        out.push_str(&quote_field(segment.label.as_str()));
        out.push(',');
        out.push_str(&format_seconds(segment.duration_seconds));
        out.push(',');
        out.push_str(&format_seconds(segment.cumulative_seconds));
        out.push('\n');
    }
    out
}

/// Quote a field that contains a delimiter, quote or line break
fn quote_field(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn format_seconds(seconds: f64) -> String {
    // avoid "-0.000"
    let seconds = if seconds.abs() < 0.0005 { 0.0 } else { seconds };
    format!("{:.3}", seconds)
}
