//! Cancellable operation context.
//!
//! Every orchestrator call receives an [`OperationContext`]. Storage calls are
//! started through [`OperationContext::run`], so cancelling the context drops
//! the in-flight call and the operation ends with [`AppError::Cancelled`].

use std::future::Future;

use tokio_util::sync::{CancellationToken, DropGuard};

use common::{AppError, AppResult};

/// Per-operation cancellation handle.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    token: CancellationToken,
}

impl OperationContext {
    /// Create a fresh, uncancelled context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context that is cancelled together with this one,
    /// but can also be cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Cancel this context and all of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Guard that cancels the context when dropped.
    ///
    /// The HTTP layer holds one per request, so a client disconnect (which
    /// drops the handler future) cancels whatever storage call is pending.
    pub fn drop_guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    /// Start `op` and drive it to completion unless the context is
    /// cancelled first.
    ///
    /// An already-cancelled context never calls `op`.
    pub async fn run<F, Fut, T>(&self, op: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        if self.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let fut = op();
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(AppError::Cancelled),
            result = fut => result,
        }
    }
}
