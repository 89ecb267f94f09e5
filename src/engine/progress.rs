//! Progress reporting for long-running video analysis

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tracing::info;

/// Progress callback trait
pub trait ProgressCallback: Send + Sync {
    /// Called when operation starts
    fn on_start(&self, operation: &str, total_work: Option<u64>);

    /// Called after each unit of work; `completed` never decreases
    fn on_progress(&self, completed: u64, total: Option<u64>);

    /// Called when operation completes successfully
    fn on_complete(&self, message: &str);

    /// Called when operation fails
    fn on_error(&self, error: &str);
}

/// Logs every `step` percent through `tracing`
pub struct TracingProgress {
    label: String,
    step: u64,
    next_milestone: AtomicU64,
    started: Instant,
}

impl TracingProgress {
    /// Report for `label` (usually the video file name) every 10%
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_step(label, 10)
    }

    pub fn with_step(label: impl Into<String>, step: u64) -> Self {
        let step = step.clamp(1, 100);
        Self {
            label: label.into(),
            step,
            next_milestone: AtomicU64::new(step),
            started: Instant::now(),
        }
    }

    /// Highest milestone reached for `percent`, if it was not reported yet
    fn take_milestone(&self, percent: u64) -> Option<u64> {
        let next = self.next_milestone.load(Ordering::Relaxed);
        if percent < next || next > 100 {
            return None;
        }
        let reached = percent - percent % self.step;
        self.next_milestone.store(reached + self.step, Ordering::Relaxed);
        Some(reached)
    }
}

impl ProgressCallback for TracingProgress {
    fn on_start(&self, operation: &str, total_work: Option<u64>) {
        match total_work {
            Some(total) => info!("{}: {} ({} frames)", self.label, operation, total),
            None => info!("{}: {}", self.label, operation),
        }
    }

    fn on_progress(&self, completed: u64, total: Option<u64>) {
        let Some(total) = total.filter(|t| *t > 0) else {
            return;
        };
        let percent = (completed.min(total) * 100) / total;
        if let Some(milestone) = self.take_milestone(percent) {
            info!(
                "{}: {:>3}% ({}/{} frames, {:.1}s elapsed)",
                self.label,
                milestone,
                completed.min(total),
                total,
                self.started.elapsed().as_secs_f64()
            );
        }
    }

    fn on_complete(&self, message: &str) {
        info!(
            "{}: {} in {:.2}s",
            self.label,
            message,
            self.started.elapsed().as_secs_f64()
        );
    }

    fn on_error(&self, error: &str) {
        tracing::error!("{}: {}", self.label, error);
    }
}

/// No-op progress callback for when progress tracking is disabled
pub struct NoOpProgressCallback;

impl ProgressCallback for NoOpProgressCallback {
    fn on_start(&self, _operation: &str, _total_work: Option<u64>) {}
    fn on_progress(&self, _completed: u64, _total: Option<u64>) {}
    fn on_complete(&self, _message: &str) {}
    fn on_error(&self, _error: &str) {}
}
