//! Exponential backoff retry
//!
//! One policy type drives every retried call site. Callers pass the
//! predicate that decides which errors are worth another attempt.

use crate::error::{Error, Result};
use crate::events::{PipelineEvent, PipelineObserver};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Wait after the first failed attempt
    pub base_delay: Duration,
    /// Upper bound for any single wait
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::page()
    }
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Policy for the token request: 3 attempts, 2s doubling to 10s
    pub fn authentication() -> Self {
        Self::new(3, Duration::from_secs(2), Duration::from_secs(10))
    }

    /// Policy for a single page request: 5 attempts, 2s doubling to 10s
    pub fn page() -> Self {
        Self::new(5, Duration::from_secs(2), Duration::from_secs(10))
    }

    /// Policy for riding out HTTP 429 on a page: 5 attempts, 2s doubling to 10s
    pub fn rate_limit() -> Self {
        Self::new(5, Duration::from_secs(2), Duration::from_secs(10))
    }

    /// Same attempt budget with different delays
    #[must_use]
    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    /// Same delays with a different attempt budget
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Wait after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`, capped
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let factor = 2u32.saturating_pow(exponent);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Wait after failed attempt `attempt`, honouring a server `Retry-After` hint
    pub fn delay_for(&self, attempt: u32, error: &Error) -> Duration {
        match error.retry_after_seconds() {
            Some(secs) => Duration::from_secs(secs).min(self.max_delay),
            None => self.backoff_delay(attempt),
        }
    }

    /// Run `f` until it succeeds, fails with an error `should_retry` rejects,
    /// or the attempt budget is spent
    ///
    /// The error returned on exhaustion is the last one seen, unchanged, so
    /// callers can still classify it.
    pub async fn execute<T, F, Fut, P>(
        &self,
        operation: &str,
        should_retry: P,
        observer: &dyn PipelineObserver,
        mut f: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        P: Fn(&Error) -> bool,
    {
        let mut attempt: u32 = 1;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "Operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if !should_retry(&error) {
                        return Err(error);
                    }

                    if attempt >= self.max_attempts {
                        observer.on_event(&PipelineEvent::RetriesExhausted {
                            operation: operation.to_string(),
                            attempts: attempt,
                            error: error.to_string(),
                        });
                        return Err(error);
                    }

                    let delay = self.delay_for(attempt, &error);
                    observer.on_event(&PipelineEvent::RetryScheduled {
                        operation: operation.to_string(),
                        attempt,
                        max_attempts: self.max_attempts,
                        delay,
                        error: error.to_string(),
                    });
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
