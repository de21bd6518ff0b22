//! HTTP client module
//!
//! Provides the HTTP client and the retry policy shared by the
//! authentication and paging call sites.
//!
//! # Features
//!
//! - **Classified Attempts**: every failure maps to a typed [`crate::Error`]
//! - **Exponential Backoff**: doubling waits with a cap and attempt budget
//! - **Retry-After**: server hints on HTTP 429 shorten or stretch the wait

mod client;
mod retry;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use retry::RetryPolicy;
