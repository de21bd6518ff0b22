//! Pagination types and traits
//!
//! Defines the page source abstraction and the outcome of a full walk.

use crate::error::Result;
use crate::types::Record;
use async_trait::async_trait;
use serde::Serialize;

/// Something that can return page `n` of a collection
///
/// An empty vector means the collection is exhausted.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the records of one page (1-based). One call is one attempt.
    async fn fetch_page(&self, page: u32) -> Result<Vec<Record>>;
}

/// Why pagination stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HaltReason {
    /// An empty page was returned; the collection is complete
    Exhausted,
    /// The server kept answering 429 until the rate-limit budget ran out
    RateLimited {
        /// Page that could not be fetched
        page: u32,
    },
    /// A transport, status or decode failure ended paging
    Failed {
        /// Page that could not be fetched
        page: u32,
        /// Last error
        error: String,
    },
}

impl HaltReason {
    /// Whether records may be missing
    pub fn is_partial(&self) -> bool {
        !matches!(self, Self::Exhausted)
    }
}

/// Result of walking every page
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Records in page order, then within-page order
    pub records: Vec<Record>,
    /// Non-empty pages received
    pub pages_fetched: u32,
    /// Why paging stopped
    pub halt: HaltReason,
}

impl FetchOutcome {
    /// Whether every page was retrieved
    pub fn is_complete(&self) -> bool {
        !self.halt.is_partial()
    }

    /// Number of records retrieved
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was retrieved
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
