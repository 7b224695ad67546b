//! Cooperative cancellation for in-flight matching tasks.
//!
//! Heavy-path evaluation polls the token at every stage boundary (after
//! normalization, after candidate generation, after scoring). There is no
//! preemption: a running stage always completes, so cancellation latency is
//! bounded by one stage.

use crate::error::{Result, TaxonError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag for one session's matching tasks.
///
/// Cloning produces another handle to the same flag, so a session can hand a
/// clone to every task it spawns and cancel them all at once.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal every holder of this token to abort at its next poll point.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Stage-boundary poll: returns `Err(Cancelled)` once the token fires.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(TaxonError::Cancelled)
        } else {
            Ok(())
        }
    }
}
