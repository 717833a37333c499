//! Cancellation for in-flight tutor requests.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::error::TutorError;

/// Shared flag the view layer trips when the player navigates away.
///
/// Clones observe the same flag. Once cancelled it stays cancelled; make a
/// new token for the next screen.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Run `request` with a deadline, abandoning it if `cancel` fires first.
pub async fn with_deadline<T, F>(
    request: F,
    limit: Duration,
    cancel: &CancelToken,
) -> Result<T, TutorError>
where
    F: Future<Output = Result<T, TutorError>>,
{
    if cancel.is_cancelled() {
        return Err(TutorError::Cancelled);
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(TutorError::Cancelled),
        result = tokio::time::timeout(limit, request) => {
            result.unwrap_or_else(|_| Err(TutorError::Timeout { secs: limit.as_secs() }))
        }
    }
}
