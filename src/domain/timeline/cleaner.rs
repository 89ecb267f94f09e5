//! Raw timeline cleaner
//!
//! Collapses a raw sample sequence into contiguous segments. The only state is
//! the currently open segment; closing it yields an immutable [`Segment`].
//!
//! Low-confidence samples never open or close a segment. The first confident
//! sample opens the first segment at time zero, so time before it is credited
//! to that screen and the segments always cover the whole recording. When no
//! sample is confident, a single low-confidence segment covers everything.

use crate::domain::model::{PageLabel, Sample, Segment};
use crate::error::{ScreenTraceError, ScreenTraceResult};

#[derive(Debug, Clone)]
struct OpenSegment {
    label: PageLabel,
    start_seconds: f64,
}

/// Incremental segment builder
#[derive(Debug, Default)]
pub struct TimelineCleaner {
    open: Option<OpenSegment>,
    segments: Vec<Segment>,
    last_timestamp: Option<f64>,
}

impl TimelineCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next raw sample
    pub fn push(&mut self, sample: &Sample) {
        self.last_timestamp = Some(sample.timestamp_seconds);

        if sample.label.is_low_confidence() {
            return;
        }

        match &self.open {
            None => {
                self.open = Some(OpenSegment {
                    label: sample.label.clone(),
                    start_seconds: 0.0,
                });
            }
            Some(open) if open.label != sample.label => {
                self.close_open(sample.timestamp_seconds);
                self.open = Some(OpenSegment {
                    label: sample.label.clone(),
                    start_seconds: sample.timestamp_seconds,
                });
            }
            Some(_) => {}
        }
    }

    /// Close the open segment at the last sample's timestamp
    pub fn finish(mut self) -> ScreenTraceResult<Vec<Segment>> {
        let end = self.last_timestamp.ok_or(ScreenTraceError::EmptyInput)?;

        if self.open.is_none() {
            self.open = Some(OpenSegment {
                label: PageLabel::LowConfidence,
                start_seconds: 0.0,
            });
        }
        self.close_open(end);

        Ok(self.segments)
    }

    fn close_open(&mut self, end_seconds: f64) {
        if let Some(open) = self.open.take() {
            self.segments.push(Segment::new(
                open.label,
                end_seconds - open.start_seconds,
                end_seconds,
            ));
        }
    }
}

/// Collapse a raw timeline into segments
pub fn clean(raw: &[Sample]) -> ScreenTraceResult<Vec<Segment>> {
    let mut cleaner = TimelineCleaner::new();
    for sample in raw {
        cleaner.push(sample);
    }
    cleaner.finish()
}
