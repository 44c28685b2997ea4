//! Cooperative cancellation for per-caller interest in a fetch.
//!
//! A token represents one caller's interest. Cancelling it withdraws that caller
//! only; whoever owns the underlying work decides what to do once nobody is
//! interested anymore.

use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Default)]
struct TokenState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cancellation token shared between a caller and the operation it started.
///
/// Clones observe the same state. Cancelling is idempotent and safe to call at
/// any time, including after the operation finished.
#[derive(Clone, Default)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    /// Creates a token in the non-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and wakes every task waiting in [`Self::cancelled`].
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::AcqRel) {
            self.state.notify.notify_waiters();
        }
    }

    /// Returns true once [`Self::cancel`] was called on this token or a clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// Completes when the token is cancelled.
    pub async fn cancelled(&self) {
        let mut notified = pin!(self.state.notify.notified());
        // Register before checking the flag so a concurrent cancel cannot slip between.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());

        // idempotent
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancelled_future_wakes_on_cancel() {
        let token = CancellationToken::new();
        let mut waiter = task::spawn(token.cancelled());

        assert_pending!(waiter.poll());
        token.cancel();
        assert!(waiter.is_woken());
        assert_ready!(waiter.poll());
    }

    #[test]
    fn test_already_cancelled_is_ready() {
        let token = CancellationToken::new();
        token.cancel();
        let mut waiter = task::spawn(token.cancelled());
        assert_ready!(waiter.poll());
    }

    #[tokio::test]
    async fn test_cancel_from_other_task() {
        let token = CancellationToken::new();
        let remote = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            remote.cancel();
        });

        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .expect("token should be cancelled");
    }
}
