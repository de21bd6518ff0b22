//! Page-number walker
//!
//! Requests pages 1, 2, 3, … until one comes back empty. Failures never
//! escape: whatever was collected before a halt is returned.

use super::types::{FetchOutcome, HaltReason, PageSource};
use crate::error::Result;
use crate::events::{PipelineEvent, PipelineObserver};
use crate::http::RetryPolicy;
use crate::types::Record;
use std::time::Duration;
use tracing::debug;

/// Default pause between consecutive non-empty pages
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(1);

/// Walks a [`PageSource`] with retry, rate-limit handling and pacing
#[derive(Debug, Clone)]
pub struct PageFetcher {
    /// Retries transport errors and retryable statuses on one page
    page_policy: RetryPolicy,
    /// Separate budget for riding out HTTP 429
    rate_limit_policy: RetryPolicy,
    /// Pause after each non-empty page
    page_delay: Duration,
    /// First page index
    start_page: u32,
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PageFetcher {
    /// Create a fetcher with the standard policies and a 1s page delay
    pub fn new() -> Self {
        Self {
            page_policy: RetryPolicy::page(),
            rate_limit_policy: RetryPolicy::rate_limit(),
            page_delay: DEFAULT_PAGE_DELAY,
            start_page: 1,
        }
    }

    /// Override the per-page retry policy
    #[must_use]
    pub fn with_page_policy(mut self, policy: RetryPolicy) -> Self {
        self.page_policy = policy;
        self
    }

    /// Override the rate-limit retry policy
    #[must_use]
    pub fn with_rate_limit_policy(mut self, policy: RetryPolicy) -> Self {
        self.rate_limit_policy = policy;
        self
    }

    /// Override the pause between pages
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Get the pause between pages
    pub fn page_delay(&self) -> Duration {
        self.page_delay
    }

    /// Fetch every page until an empty one or a halting error
    pub async fn fetch_all(
        &self,
        source: &dyn PageSource,
        observer: &dyn PipelineObserver,
    ) -> FetchOutcome {
        let mut records: Vec<Record> = Vec::new();
        let mut pages_fetched = 0;
        let mut page = self.start_page;

        let halt = loop {
            observer.on_event(&PipelineEvent::PageRequested { page });

            match self.fetch_page(source, page, observer).await {
                Ok(members) if members.is_empty() => break HaltReason::Exhausted,
                Ok(members) => {
                    let count = members.len();
                    records.extend(members);
                    pages_fetched += 1;
                    observer.on_event(&PipelineEvent::PageFetched {
                        page,
                        records: count,
                        total: records.len(),
                    });

                    page = page.saturating_add(1);
                    if !self.page_delay.is_zero() {
                        tokio::time::sleep(self.page_delay).await;
                    }
                }
                Err(error) if error.is_rate_limited() => break HaltReason::RateLimited { page },
                Err(error) => {
                    break HaltReason::Failed {
                        page,
                        error: error.to_string(),
                    }
                }
            }
        };

        observer.on_event(&PipelineEvent::FetchHalted {
            reason: halt.clone(),
            total: records.len(),
        });

        FetchOutcome {
            records,
            pages_fetched,
            halt,
        }
    }

    /// Fetch one page
    ///
    /// HTTP 429 and the other retryable failures draw on separate attempt
    /// counters. Neither counter is reset while the page is being retried.
    async fn fetch_page(
        &self,
        source: &dyn PageSource,
        page: u32,
        observer: &dyn PipelineObserver,
    ) -> Result<Vec<Record>> {
        let mut error_attempts: u32 = 0;
        let mut rate_limit_attempts: u32 = 0;

        loop {
            let error = match source.fetch_page(page).await {
                Ok(members) => {
                    if error_attempts + rate_limit_attempts > 0 {
                        debug!(
                            page,
                            error_attempts,
                            rate_limit_attempts,
                            "Page fetched after retries"
                        );
                    }
                    return Ok(members);
                }
                Err(error) => error,
            };

            let (policy, attempt) = if error.is_rate_limited() {
                rate_limit_attempts += 1;
                (&self.rate_limit_policy, rate_limit_attempts)
            } else if error.is_retryable() {
                error_attempts += 1;
                (&self.page_policy, error_attempts)
            } else {
                return Err(error);
            };

            if attempt >= policy.max_attempts {
                observer.on_event(&PipelineEvent::RetriesExhausted {
                    operation: format!("page {page}"),
                    attempts: attempt,
                    error: error.to_string(),
                });
                return Err(error);
            }

            let delay = policy.delay_for(attempt, &error);
            observer.on_event(&PipelineEvent::RetryScheduled {
                operation: format!("page {page}"),
                attempt,
                max_attempts: policy.max_attempts,
                delay,
                error: error.to_string(),
            });
            tokio::time::sleep(delay).await;
        }
    }
}
