use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::error::SqlNamedError;

/// Cancellation scope for one or more database calls.
///
/// A context ends when its token is cancelled (directly or through a parent) or when its
/// deadline passes. Clones share the same token.
///
/// ```rust
/// use std::time::Duration;
/// use sql_named_ext::prelude::*;
///
/// let ctx = ExecContext::new().with_timeout(Duration::from_secs(5));
/// assert!(ctx.err().is_none());
/// ctx.cancel();
/// assert!(matches!(ctx.err(), Some(SqlNamedError::ContextCanceled)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ExecContext {
    /// A context that never ends on its own.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing token, e.g. one owned by a server's shutdown logic.
    #[must_use]
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Deadline `timeout` from now; an earlier existing deadline is kept.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// A context that ends with this one but can also be cancelled on its own.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Why the context ended, or `None` while it is still live.
    #[must_use]
    pub fn err(&self) -> Option<SqlNamedError> {
        if self.token.is_cancelled() {
            Some(SqlNamedError::ContextCanceled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(SqlNamedError::ContextDeadlineExceeded)
        } else {
            None
        }
    }

    /// Resolves once the context ends, yielding the reason.
    pub async fn done(&self) -> SqlNamedError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                () = self.token.cancelled() => SqlNamedError::ContextCanceled,
                () = sleep_until(deadline) => SqlNamedError::ContextDeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                SqlNamedError::ContextCanceled
            }
        }
    }

    /// Drive `fut` unless the context ends first.
    ///
    /// A context that has already ended fails without polling `fut`. When it ends mid-flight
    /// `fut` is dropped; callers that need to abort work on the server side race
    /// [`done`](Self::done) themselves.
    ///
    /// # Errors
    ///
    /// Returns `fut`'s error, or `ContextCanceled` / `ContextDeadlineExceeded`.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, SqlNamedError>
    where
        F: Future<Output = Result<T, SqlNamedError>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            res = fut => res,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelled_context_fails_before_polling() {
        let ctx = ExecContext::new();
        ctx.cancel();
        let mut polled = false;
        let res = ctx
            .run(async {
                polled = true;
                Ok(())
            })
            .await;
        assert!(matches!(res, Err(SqlNamedError::ContextCanceled)));
        assert!(!polled);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_interrupts_slow_work() {
        let ctx = ExecContext::new().with_timeout(Duration::from_millis(50));
        let res = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        assert!(matches!(res, Err(SqlNamedError::ContextDeadlineExceeded)));
    }

    #[tokio::test]
    async fn parent_cancel_reaches_child() {
        let parent = ExecContext::new();
        let child = parent.child();
        parent.cancel();
        assert!(child.is_done());

        let other = ExecContext::new();
        let child = other.child();
        child.cancel();
        assert!(!other.is_done());
    }

    #[test]
    fn external_token_controls_the_context() {
        let shutdown = CancellationToken::new();
        let ctx = ExecContext::from_token(shutdown.child_token());
        assert!(ctx.err().is_none());
        shutdown.cancel();
        assert!(matches!(ctx.err(), Some(SqlNamedError::ContextCanceled)));
    }

    #[test]
    fn earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = ExecContext::new()
            .with_deadline(now + Duration::from_secs(1))
            .with_deadline(now + Duration::from_secs(60));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn live_context_passes_result_through() {
        let ctx = ExecContext::new();
        assert_eq!(ctx.run(async { Ok(7) }).await.unwrap(), 7);
    }
}
