//! Pipeline events
//!
//! The retry, auth and fetch code never logs directly. It reports what
//! happens to a [`PipelineObserver`]; the binary installs
//! [`TracingObserver`], tests install [`RecordingObserver`].

use crate::pagination::HaltReason;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Something that happened during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// A bearer token was obtained
    AuthenticationSucceeded {
        /// Attempts used, including the successful one
        attempts: u32,
    },
    /// Authentication gave up; the run aborts
    AuthenticationFailed {
        /// Attempts used
        attempts: u32,
        /// Last underlying cause
        error: String,
    },
    /// A page is about to be requested
    PageRequested {
        /// Page index (1-based)
        page: u32,
    },
    /// A non-empty page was received
    PageFetched {
        /// Page index
        page: u32,
        /// Records on this page
        records: usize,
        /// Records accumulated so far
        total: usize,
    },
    /// A failed attempt will be retried after `delay`
    RetryScheduled {
        /// Operation label, e.g. "authenticate" or "page 3"
        operation: String,
        /// The attempt that just failed (1-based)
        attempt: u32,
        /// Attempt budget of the policy
        max_attempts: u32,
        /// Wait before the next attempt
        delay: Duration,
        /// Cause of the failed attempt
        error: String,
    },
    /// A retry budget ran out
    RetriesExhausted {
        /// Operation label
        operation: String,
        /// Attempts used
        attempts: u32,
        /// Last cause
        error: String,
    },
    /// Pagination stopped
    FetchHalted {
        /// Why paging stopped
        reason: HaltReason,
        /// Records accumulated
        total: usize,
    },
    /// Nothing was fetched, so nothing is written
    NoData,
    /// The sink accepted the table
    TableWritten {
        /// Data rows written
        rows: usize,
        /// Columns written
        columns: usize,
        /// Where the table went
        destination: String,
    },
}

/// Log level for pipeline events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// General information
    Info,
    /// Warning
    Warn,
    /// Error (non-fatal unless the run aborts)
    Error,
}

impl PipelineEvent {
    /// Severity the event should be reported at
    pub fn level(&self) -> LogLevel {
        match self {
            Self::PageRequested { .. } => LogLevel::Debug,
            Self::AuthenticationSucceeded { .. }
            | Self::PageFetched { .. }
            | Self::NoData
            | Self::TableWritten { .. } => LogLevel::Info,
            Self::RetryScheduled { .. } => LogLevel::Warn,
            Self::FetchHalted { reason, .. } => {
                if reason.is_partial() {
                    LogLevel::Error
                } else {
                    LogLevel::Info
                }
            }
            Self::AuthenticationFailed { .. } | Self::RetriesExhausted { .. } => LogLevel::Error,
        }
    }
}

/// Receives pipeline events
pub trait PipelineObserver: Send + Sync {
    /// Handle one event
    fn on_event(&self, event: &PipelineEvent);
}

/// Observer that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_event(&self, _event: &PipelineEvent) {}
}

/// Observer that turns events into `tracing` log lines
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::AuthenticationSucceeded { attempts } => {
                info!(attempts, "Successfully authenticated");
            }
            PipelineEvent::AuthenticationFailed { attempts, error } => {
                error!(attempts, %error, "Failed to obtain authentication token");
            }
            PipelineEvent::PageRequested { page } => {
                debug!(page, "Fetching page");
            }
            PipelineEvent::PageFetched {
                page,
                records,
                total,
            } => {
                info!(page, records, total, "Fetched page");
            }
            PipelineEvent::RetryScheduled {
                operation,
                attempt,
                max_attempts,
                delay,
                error,
            } => {
                warn!(
                    %operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "Attempt failed, retrying"
                );
            }
            PipelineEvent::RetriesExhausted {
                operation,
                attempts,
                error,
            } => {
                error!(%operation, attempts, %error, "Retries exhausted");
            }
            PipelineEvent::FetchHalted { reason, total } => match reason {
                HaltReason::Exhausted => info!(total, "No more data to fetch"),
                HaltReason::RateLimited { page } => {
                    error!(page, total, "Still rate limited, keeping partial results");
                }
                HaltReason::Failed { page, error } => {
                    error!(page, total, %error, "Error while fetching page, keeping partial results");
                }
            },
            PipelineEvent::NoData => info!("No data fetched"),
            PipelineEvent::TableWritten {
                rows,
                columns,
                destination,
            } => {
                info!(rows, columns, %destination, "Data saved");
            }
        }
    }
}

/// Observer that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Number of `RetryScheduled` events seen
    pub fn retry_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, PipelineEvent::RetryScheduled { .. }))
            .count()
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
