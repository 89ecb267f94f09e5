//! Raw timeline construction and cleaning
//!
//! The builder turns per-frame classifications into [`Sample`]s, replacing
//! weak detections with the low-confidence marker. The cleaner collapses those
//! samples into contiguous [`Segment`]s.
//!
//! [`Sample`]: crate::domain::model::Sample
//! [`Segment`]: crate::domain::model::Segment

pub mod builder;
pub mod cleaner;

#[cfg(test)]
mod tests;

pub use builder::TimelineBuilder;
pub use cleaner::{clean, TimelineCleaner};

/// Default minimum score (exclusive) for a confident detection
pub const DEFAULT_FEATURE_CUTOFF: u32 = 10;
