use crate::domain::context::Context;
use crate::domain::order::Order;
use crate::domain::ports::PaymentPort;
use crate::domain::status::{Code, Status};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

// ============================================================================
// Exponential Backoff Retry Around the Charge Call
// ============================================================================
//
// Transient payment failures (service unavailable, resource exhausted) are
// retried with a doubling delay plus up to `jitter_fraction` of random extra
// wait. Anything else is returned on the first attempt.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Upper bound of the random extra delay, as a fraction of the computed delay
    pub jitter_fraction: f64,
    /// Codes that are worth another attempt
    pub retryable: Vec<Code>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            jitter_fraction: 0.10,
            retryable: vec![Code::Unavailable, Code::ResourceExhausted],
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable(&self, code: Code) -> bool {
        self.retryable.contains(&code)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    ///
    /// Lies in `[base * 2^(attempt-1), base * 2^(attempt-1) * (1 + jitter_fraction)]`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self.base_delay.saturating_mul(1u32 << exponent);
        let jitter = if self.jitter_fraction > 0.0 {
            rand::thread_rng().gen_range(0.0..=self.jitter_fraction)
        } else {
            0.0
        };
        delay.mul_f64(1.0 + jitter)
    }
}

/// Wraps a [`PaymentPort`] and retries transient charge failures.
///
/// Each attempt is bounded by the caller's per-call budget from the
/// [`Context`]; an attempt that runs out of budget fails with
/// `deadline-exceeded`, which is not retried. The sleeps between attempts are
/// not bounded by that budget.
pub struct RetryingPaymentClient<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: PaymentPort> RetryingPaymentClient<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn with_default_policy(inner: P) -> Self {
        Self::new(inner, RetryPolicy::default())
    }

    async fn attempt(&self, ctx: &Context, order: &Order) -> Result<(), Status> {
        ctx.bound(self.inner.charge(ctx, order))
            .await
            .unwrap_or_else(|_| Err(Status::deadline_exceeded("payment call timed out")))
    }
}

#[async_trait]
impl<P: PaymentPort> PaymentPort for RetryingPaymentClient<P> {
    async fn charge(&self, ctx: &Context, order: &Order) -> Result<(), Status> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            tracing::debug!(
                attempt = attempt,
                max_attempts = self.policy.max_attempts,
                "Attempting charge"
            );

            match self.attempt(ctx, order).await {
                Ok(()) => {
                    if attempt > 1 {
                        tracing::info!(attempt = attempt, "Charge succeeded after retry");
                    }
                    return Ok(());
                }
                Err(status) => {
                    if !self.policy.is_retryable(status.code) {
                        tracing::warn!(
                            code = %status.code,
                            error = %status,
                            "Permanent charge failure, not retrying"
                        );
                        return Err(status);
                    }

                    if attempt >= self.policy.max_attempts {
                        tracing::error!(
                            attempt = attempt,
                            error = %status,
                            "Charge failed after all retries"
                        );
                        return Err(status);
                    }

                    let delay = self.policy.backoff(attempt);
                    tracing::warn!(
                        attempt = attempt,
                        error = %status,
                        delay_ms = delay.as_millis() as u64,
                        "Transient charge failure, retrying after delay"
                    );

                    sleep(delay).await;
                }
            }
        }
    }
}
