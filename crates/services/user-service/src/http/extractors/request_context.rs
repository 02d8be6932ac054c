//! Per-request operation context.

use std::convert::Infallible;
use std::ops::Deref;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tokio_util::sync::DropGuard;

use crate::context::OperationContext;

/// An [`OperationContext`] tied to the lifetime of the handler future.
///
/// If the client goes away, axum drops the handler future, the guard is
/// dropped with it, and any storage call still pending is cancelled.
pub struct RequestContext {
    ctx: OperationContext,
    _guard: DropGuard,
}

impl RequestContext {
    pub fn new() -> Self {
        let ctx = OperationContext::new();
        let guard = ctx.drop_guard();
        Self { ctx, _guard: guard }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for RequestContext {
    type Target = OperationContext;

    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropping_request_cancels_context() {
        let request = RequestContext::new();
        let ctx = request.child();

        assert!(!ctx.is_cancelled());
        drop(request);
        assert!(ctx.is_cancelled());
    }
}
