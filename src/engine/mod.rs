//! Execution engine module
//!
//! Runs one export: authenticate, fetch every page, normalize, hand the
//! table to a sink.
//!
//! # Overview
//!
//! - `ExportEngine` - wires the HTTP client, authenticator and fetcher
//! - `RunSummary` - what a run retrieved and where it went
//!
//! Authentication failure is the only fetch-side error that reaches the
//! caller. Partial and empty results are reported through the summary.

mod types;

pub use types::RunSummary;

use crate::auth::TokenAuthenticator;
use crate::config::AppConfig;
use crate::error::Result;
use crate::events::{PipelineEvent, PipelineObserver, TracingObserver};
use crate::http::{HttpClient, RetryPolicy};
use crate::normalize::Table;
use crate::output::ExportSink;
use crate::pagination::{HttpPageSource, PageFetcher};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Export engine for one configured service
pub struct ExportEngine {
    /// Run settings
    config: AppConfig,
    /// HTTP client shared by login and page requests
    client: HttpClient,
    /// Token exchange
    authenticator: TokenAuthenticator,
    /// Page walker
    fetcher: PageFetcher,
    /// Event receiver
    observer: Arc<dyn PipelineObserver>,
}

impl ExportEngine {
    /// Create an engine from a config
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = HttpClient::with_config(config.http_config())?;
        let authenticator =
            TokenAuthenticator::new(client.clone()).with_auth_path(config.auth_path.as_str());
        let fetcher = PageFetcher::new().with_page_delay(config.page_delay);

        Ok(Self {
            config: config.clone(),
            client,
            authenticator,
            fetcher,
            observer: Arc::new(TracingObserver),
        })
    }

    /// Set the event receiver
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Override the login retry policy
    #[must_use]
    pub fn with_auth_policy(mut self, policy: RetryPolicy) -> Self {
        self.authenticator = self.authenticator.with_policy(policy);
        self
    }

    /// Replace the page walker
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: PageFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Get the run settings
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run one export into `sink`
    ///
    /// The sink is not touched when authentication fails or nothing is
    /// fetched.
    pub async fn run(&self, sink: &mut dyn ExportSink) -> Result<RunSummary> {
        let started_at = Utc::now();
        let observer = self.observer.as_ref();
        info!(base_url = %self.config.base_url, "Starting export");

        let token = self
            .authenticator
            .authenticate(&self.config.credentials, observer)
            .await?;

        let source = HttpPageSource::new(
            self.client.clone(),
            self.config.collection_path.as_str(),
            token,
            self.config.credentials.switch_user(),
        )
        .with_member_key(self.config.member_key.as_str());

        let outcome = self.fetcher.fetch_all(&source, observer).await;

        if outcome.is_empty() {
            observer.on_event(&PipelineEvent::NoData);
            return Ok(RunSummary {
                started_at,
                finished_at: Utc::now(),
                records: 0,
                pages: outcome.pages_fetched,
                halt: outcome.halt,
                columns: 0,
                output: None,
            });
        }

        let table = Table::from_records(&outcome.records, &self.config.text_columns);
        sink.write(&table)?;

        let destination = sink.destination();
        observer.on_event(&PipelineEvent::TableWritten {
            rows: table.row_count(),
            columns: table.column_count(),
            destination: destination.clone(),
        });

        Ok(RunSummary {
            started_at,
            finished_at: Utc::now(),
            records: outcome.records.len(),
            pages: outcome.pages_fetched,
            halt: outcome.halt,
            columns: table.column_count(),
            output: Some(destination),
        })
    }
}

impl std::fmt::Debug for ExportEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportEngine")
            .field("config", &self.config)
            .field("fetcher", &self.fetcher)
            .finish_non_exhaustive()
    }
}
