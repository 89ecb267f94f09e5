//! Raw timeline builder

use tracing::debug;

use crate::domain::model::{Classification, PageLabel, Sample};

/// Accumulates classifications into an ordered raw timeline
#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    feature_cutoff: u32,
    samples: Vec<Sample>,
}

impl TimelineBuilder {
    /// Create a builder that marks scores `<= feature_cutoff` as low confidence
    pub fn new(feature_cutoff: u32) -> Self {
        Self {
            feature_cutoff,
            samples: Vec::new(),
        }
    }

    /// Create a builder with room for `capacity` samples
    pub fn with_capacity(feature_cutoff: u32, capacity: usize) -> Self {
        Self {
            feature_cutoff,
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn feature_cutoff(&self) -> u32 {
        self.feature_cutoff
    }

    /// Append the classification observed at `timestamp_seconds`
    ///
    /// Timestamps never move backwards: a value earlier than the previous
    /// sample is clamped to it.
    pub fn push(&mut self, timestamp_seconds: f64, classification: Classification) -> &Sample {
        let timestamp_seconds = match self.samples.last() {
            Some(last) if timestamp_seconds < last.timestamp_seconds => {
                debug!(
                    "Clamping regressing timestamp {:.3}s to {:.3}s",
                    timestamp_seconds, last.timestamp_seconds
                );
                last.timestamp_seconds
            }
            _ => timestamp_seconds,
        };

        let sample = if classification.score <= self.feature_cutoff {
            Sample::low_confidence(timestamp_seconds)
        } else {
            Sample::new(
                timestamp_seconds,
                PageLabel::Screen(classification.label),
                classification.score,
            )
        };

        self.samples.push(sample);
        &self.samples[self.samples.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Finish and return the raw timeline
    pub fn build(self) -> Vec<Sample> {
        self.samples
    }

    /// Build a raw timeline from `(timestamp, classification)` pairs
    pub fn from_classifications<I>(feature_cutoff: u32, classifications: I) -> Vec<Sample>
    where
        I: IntoIterator<Item = (f64, Classification)>,
    {
        let mut builder = Self::new(feature_cutoff);
        for (timestamp, classification) in classifications {
            builder.push(timestamp, classification);
        }
        builder.build()
    }
}
