//! Execution context threaded through every request.
//!
//! A context carries the caller's cancellation token and/or deadline. The
//! client checks it before every attempt and races it against the network call
//! and the backoff wait, so a fired context bounds the remaining latency to
//! roughly one in-flight attempt.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why an execution context fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller's cancellation token was triggered.
    Cancelled,
    /// The context's deadline passed.
    DeadlineExceeded,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled by caller"),
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Cancellation and deadline signal for one logical call.
///
/// Owned by the caller and read-only to the client. Cloning is cheap; clones
/// observe the same token.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ExecutionContext {
    /// Creates a context that never fires on its own.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Creates a context driven by an externally owned cancellation token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Attaches a deadline `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// The underlying cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns the fire reason if the context has already fired.
    ///
    /// An explicit cancellation takes precedence over an elapsed deadline when
    /// both have occurred.
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            return Some(CancelReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Some(CancelReason::DeadlineExceeded)
            }
            _ => None,
        }
    }

    /// Resolves when the context fires; pending forever for a plain context.
    pub async fn cancelled(&self) -> CancelReason {
        tokio::select! {
            _ = self.token.cancelled() => CancelReason::Cancelled,
            _ = async {
                match self.deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending().await,
                }
            } => CancelReason::DeadlineExceeded,
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context_is_not_cancelled() {
        let ctx = ExecutionContext::new();
        assert_eq!(ctx.cancel_reason(), None);
    }

    #[test]
    fn test_token_cancellation() {
        let token = CancellationToken::new();
        let ctx = ExecutionContext::with_token(token.clone());

        assert_eq!(ctx.cancel_reason(), None);
        token.cancel();
        assert_eq!(ctx.cancel_reason(), Some(CancelReason::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires() {
        let ctx = ExecutionContext::new().with_timeout(Duration::from_millis(50));

        assert_eq!(ctx.cancel_reason(), None);
        assert_eq!(ctx.cancelled().await, CancelReason::DeadlineExceeded);
        assert_eq!(ctx.cancel_reason(), Some(CancelReason::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_wins_over_later_deadline() {
        let token = CancellationToken::new();
        let ctx = ExecutionContext::with_token(token.clone())
            .with_timeout(Duration::from_secs(3600));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        assert_eq!(ctx.cancelled().await, CancelReason::Cancelled);
    }
}
