// Domain models - Core types and data structures

use std::fmt;

use serde::{Serialize, Serializer};

#[cfg(test)]
mod tests;

/// Text written for the low-confidence marker in output files
pub const LOW_CONFIDENCE_LABEL: &str = "low confidence detection";

/// Label attached to a sample or segment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageLabel {
    /// A reference screen, identified by its id
    Screen(String),
    /// Reserved marker for detections at or below the feature cutoff
    LowConfidence,
}

impl PageLabel {
    /// Create a screen label
    pub fn screen(id: impl Into<String>) -> Self {
        Self::Screen(id.into())
    }

    /// Whether this is the low-confidence marker
    pub fn is_low_confidence(&self) -> bool {
        matches!(self, Self::LowConfidence)
    }

    /// Text used in output files
    pub fn as_str(&self) -> &str {
        match self {
            Self::Screen(id) => id,
            Self::LowConfidence => LOW_CONFIDENCE_LABEL,
        }
    }
}

impl fmt::Display for PageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PageLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Best-matching screen for one frame, as reported by the classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Reference screen id with the highest match score
    pub label: String,
    /// Number of cross-checked descriptor matches
    pub score: u32,
}

impl Classification {
    /// Create a new classification
    pub fn new(label: impl Into<String>, score: u32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// One entry of the raw timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Observed frame time, in seconds from the start of the video
    pub timestamp_seconds: f64,
    pub label: PageLabel,
    /// Match score; zero for low-confidence samples
    pub score: u32,
}

impl Sample {
    /// Create a new sample
    pub fn new(timestamp_seconds: f64, label: PageLabel, score: u32) -> Self {
        Self {
            timestamp_seconds,
            label,
            score,
        }
    }

    /// Create a low-confidence sample at `timestamp_seconds`
    pub fn low_confidence(timestamp_seconds: f64) -> Self {
        Self::new(timestamp_seconds, PageLabel::LowConfidence, 0)
    }
}

/// A maximal span during which one label was displayed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub label: PageLabel,
    /// Length of the span in seconds
    pub duration_seconds: f64,
    /// Time at which the span ends, in seconds from the start of the video
    pub cumulative_seconds: f64,
}

impl Segment {
    /// Create a new segment
    pub fn new(label: PageLabel, duration_seconds: f64, cumulative_seconds: f64) -> Self {
        Self {
            label,
            duration_seconds,
            cumulative_seconds,
        }
    }

    /// Time at which the span starts
    pub fn start_seconds(&self) -> f64 {
        self.cumulative_seconds - self.duration_seconds
    }
}

/// Cleaned timeline for one video
#[derive(Debug, Clone, Serialize)]
pub struct VideoTimeline {
    /// Video file stem, used to name the output file
    pub video_name: String,
    /// Number of raw samples taken before cleaning
    pub sample_count: usize,
    pub segments: Vec<Segment>,
}

impl VideoTimeline {
    /// Total analysed time, the end of the last segment
    pub fn total_seconds(&self) -> f64 {
        self.segments
            .last()
            .map(|segment| segment.cumulative_seconds)
            .unwrap_or(0.0)
    }

    /// Seconds spent on each label, in order of first appearance
    pub fn time_per_label(&self) -> Vec<(PageLabel, f64)> {
        let mut totals: Vec<(PageLabel, f64)> = Vec::new();
        for segment in &self.segments {
            match totals.iter_mut().find(|(label, _)| *label == segment.label) {
                Some((_, total)) => *total += segment.duration_seconds,
                None => totals.push((segment.label.clone(), segment.duration_seconds)),
            }
        }
        totals
    }
}
