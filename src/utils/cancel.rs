//! Cooperative cancellation shared between workers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ScreenTraceError, ScreenTraceResult};

/// Cloneable flag checked at every sampling tick and reference-image load
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fail with `Cancelled` once cancellation was requested
    pub fn check(&self) -> ScreenTraceResult<()> {
        if self.is_cancelled() {
            Err(ScreenTraceError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancellationToken::new();
        let worker = token.clone();
        assert!(worker.check().is_ok());

        token.cancel();
        assert!(worker.is_cancelled());
        assert!(matches!(worker.check(), Err(ScreenTraceError::Cancelled)));
    }
}
