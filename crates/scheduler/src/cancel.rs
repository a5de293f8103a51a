//! Per-document cancellation.
//!
//! Every render task carries a clone of the token of the document it was
//! scheduled for. Loading another document or closing the session cancels the
//! token, and tasks check it before rendering and again before touching a
//! page surface.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cooperative cancellation flag shared between the scheduler and its tasks.
///
/// ```
/// use docview_scheduler::CancellationToken;
///
/// let token = CancellationToken::new();
/// let task_token = token.clone();
///
/// token.cancel();
/// assert!(task_token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel this token and every clone of it. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
