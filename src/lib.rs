//! # history-export
//!
//! Pulls a paginated JSON-LD collection out of a REST service and writes it
//! to a flat spreadsheet.
//!
//! ## Features
//!
//! - **Token login with retry**: `POST /auth/json` with an impersonation header
//! - **Page walking**: `?page=1, 2, …` until an empty page, with per-page
//!   retry and a separate budget for HTTP 429
//! - **Normalization**: nested records flattened to dotted columns, IRIs
//!   collapsed to their last segment, lists joined
//! - **Spreadsheet output**: one `.xlsx` worksheet with text-formatted columns
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use history_export::config::AppConfig;
//! use history_export::engine::ExportEngine;
//! use history_export::output::{XlsxSink, XlsxSinkConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> history_export::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let engine = ExportEngine::new(&config)?;
//!     let mut sink = XlsxSink::new(XlsxSinkConfig::new(&config.output_path));
//!
//!     let summary = engine.run(&mut sink).await?;
//!     println!("{} records, partial: {}", summary.records, summary.is_partial());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! AppConfig ──► TokenAuthenticator ──► PageFetcher ──► Table ──► ExportSink
//!                  (RetryPolicy)      (RetryPolicy x2)  (flatten)   (xlsx)
//!                        │                  │
//!                        └──── PipelineEvent ┴──► PipelineObserver (tracing)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Pipeline events and observers
pub mod events;

/// Token authentication
pub mod auth;

/// HTTP client and retry policy
pub mod http;

/// Page-number pagination
pub mod pagination;

/// Record flattening and table building
pub mod normalize;

/// Export sinks
pub mod output;

/// Run orchestration
pub mod engine;

/// Environment configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::AppConfig;
pub use engine::{ExportEngine, RunSummary};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
