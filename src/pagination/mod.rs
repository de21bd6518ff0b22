//! Pagination module
//!
//! Page-number pagination over a collection endpoint.
//!
//! # Overview
//!
//! [`PageFetcher`] walks a [`PageSource`] from page 1 until a page comes
//! back empty. Each page gets its own retry budget, HTTP 429 gets a
//! separate one, and any halt keeps the records gathered so far.
//!
//! The "first empty page is the last page" rule is an assumption about the
//! upstream API; a gap mid-collection would end the walk early.

mod fetcher;
mod source;
mod types;

pub use fetcher::{PageFetcher, DEFAULT_PAGE_DELAY};
pub use source::{
    extract_members, HttpPageSource, DEFAULT_COLLECTION_PATH, DEFAULT_MEMBER_KEY, PAGE_PARAM,
};
pub use types::{FetchOutcome, HaltReason, PageSource};

#[cfg(test)]
mod tests;
