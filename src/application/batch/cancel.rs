//! Whole-batch cancellation signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable flag checked by the scheduler before starting each document.
///
/// Documents already in flight run to completion; queued documents are
/// recorded as failed with [`Error::Cancelled`](crate::error::Error::Cancelled).
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancelSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let signal = CancelSignal::new();
        let observer = signal.clone();
        assert!(!observer.is_cancelled());
        signal.cancel();
        assert!(observer.is_cancelled());
    }
}
