use std::future::Future;
use std::time::Duration;
use tokio::time::error::Elapsed;
use tracing::Span;

/// Per-request context threaded through every core operation.
///
/// Carries the tracing span the transport opened for the request, so core code
/// can attach child spans without knowing the subscriber, and the time budget
/// allowed for each blocking call made on the request's behalf.
#[derive(Debug, Clone)]
pub struct Context {
    span: Span,
    timeout: Option<Duration>,
}

impl Context {
    /// A context with no time budget, attached to the current span.
    pub fn background() -> Self {
        Self {
            span: Span::current(),
            timeout: None,
        }
    }

    /// A context whose blocking calls are each cancelled after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            span: Span::current(),
            timeout: Some(timeout),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Runs `fut` within the context's time budget.
    ///
    /// Dropping the future on expiry cancels whatever call it had in flight.
    pub async fn bound<F, T>(&self, fut: F) -> Result<T, Elapsed>
    where
        F: Future<Output = T>,
    {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, fut).await,
            None => Ok(fut.await),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
