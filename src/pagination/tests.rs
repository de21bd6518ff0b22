//! Tests for pagination module

use super::*;
use crate::auth::AuthToken;
use crate::error::{Error, Result};
use crate::events::{NoopObserver, PipelineEvent, RecordingObserver};
use crate::http::{HttpClient, HttpClientConfig, RetryPolicy};
use crate::types::Record;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Scripted page source
// ============================================================================

/// Serves fixed pages; scripted failures for a page are returned first
#[derive(Default)]
struct ScriptedSource {
    pages: Vec<Vec<Record>>,
    failures: Mutex<HashMap<u32, VecDeque<Error>>>,
    calls: Mutex<Vec<u32>>,
}

impl ScriptedSource {
    fn with_pages(pages: Vec<Vec<Record>>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    fn fail(self, page: u32, errors: impl IntoIterator<Item = Error>) -> Self {
        self.failures
            .lock()
            .unwrap()
            .entry(page)
            .or_default()
            .extend(errors);
        self
    }

    fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Record>> {
        self.calls.lock().unwrap().push(page);

        if let Some(error) = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&page)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }

        Ok(self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }
}

fn quick() -> RetryPolicy {
    RetryPolicy::page().with_delays(Duration::from_millis(1), Duration::from_millis(2))
}

fn fetcher() -> PageFetcher {
    PageFetcher::new()
        .with_page_policy(quick())
        .with_rate_limit_policy(quick())
        .with_page_delay(Duration::ZERO)
}

fn rate_limited() -> Error {
    Error::RateLimited {
        retry_after_seconds: None,
    }
}

fn three_pages() -> Vec<Vec<Record>> {
    vec![
        vec![json!({"id": 1}), json!({"id": 2})],
        vec![json!({"id": 3})],
        vec![json!({"id": 4}), json!({"id": 5})],
    ]
}

fn ids(records: &[Record]) -> Vec<i64> {
    records.iter().map(|r| r["id"].as_i64().unwrap()).collect()
}

// ============================================================================
// HaltReason / FetchOutcome
// ============================================================================

#[test]
fn test_halt_reason_partial() {
    assert!(!HaltReason::Exhausted.is_partial());
    assert!(HaltReason::RateLimited { page: 2 }.is_partial());
    assert!(HaltReason::Failed {
        page: 2,
        error: "boom".to_string()
    }
    .is_partial());
}

#[test]
fn test_fetcher_defaults() {
    let fetcher = PageFetcher::default();
    assert_eq!(fetcher.page_delay(), Duration::from_secs(1));
}

// ============================================================================
// PageFetcher state machine
// ============================================================================

#[tokio::test]
async fn test_stops_at_first_empty_page() {
    let source = ScriptedSource::with_pages(three_pages());

    let outcome = fetcher().fetch_all(&source, &NoopObserver).await;

    assert_eq!(ids(&outcome.records), vec![1, 2, 3, 4, 5]);
    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(outcome.halt, HaltReason::Exhausted);
    assert!(outcome.is_complete());
    // pages 1-3 plus the empty page 4, nothing after
    assert_eq!(source.calls(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_empty_first_page_returns_nothing() {
    let source = ScriptedSource::with_pages(vec![]);

    let outcome = fetcher().fetch_all(&source, &NoopObserver).await;

    assert!(outcome.is_empty());
    assert_eq!(outcome.pages_fetched, 0);
    assert_eq!(outcome.halt, HaltReason::Exhausted);
    assert_eq!(source.calls(), vec![1]);
}

#[tokio::test]
async fn test_rate_limit_then_success_returns_everything() {
    let source = ScriptedSource::with_pages(three_pages()).fail(2, [rate_limited(), rate_limited()]);
    let observer = RecordingObserver::new();

    let outcome = fetcher().fetch_all(&source, &observer).await;

    assert_eq!(ids(&outcome.records), vec![1, 2, 3, 4, 5]);
    assert_eq!(outcome.halt, HaltReason::Exhausted);
    assert_eq!(source.calls(), vec![1, 2, 2, 2, 3, 4]);
    assert_eq!(observer.retry_count(), 2);
}

#[tokio::test]
async fn test_persistent_rate_limit_keeps_partial_results() {
    let source = ScriptedSource::with_pages(three_pages()).fail(2, (0..10).map(|_| rate_limited()));

    let outcome = fetcher().fetch_all(&source, &NoopObserver).await;

    assert_eq!(ids(&outcome.records), vec![1, 2]);
    assert_eq!(outcome.halt, HaltReason::RateLimited { page: 2 });
    // page 1 once, then the five attempts of the rate-limit budget
    assert_eq!(source.calls(), vec![1, 2, 2, 2, 2, 2]);
}

#[tokio::test]
async fn test_rate_limit_budget_is_separate_from_error_budget() {
    // seven attempts on page 2 would overrun a single five-attempt budget
    let source = ScriptedSource::with_pages(three_pages()).fail(
        2,
        [
            Error::http_status(503, ""),
            Error::http_status(503, ""),
            rate_limited(),
            Error::http_status(503, ""),
            Error::http_status(503, ""),
            rate_limited(),
        ],
    );

    let outcome = fetcher().fetch_all(&source, &NoopObserver).await;

    assert_eq!(ids(&outcome.records), vec![1, 2, 3, 4, 5]);
    assert_eq!(outcome.halt, HaltReason::Exhausted);
}

#[tokio::test]
async fn test_rate_limit_does_not_reset_error_budget() {
    // four 503s before each 429: the fifth 503 must end the page
    let mut errors = Vec::new();
    for _ in 0..4 {
        errors.extend((0..4).map(|_| Error::http_status(503, "")));
        errors.push(rate_limited());
    }
    let source = ScriptedSource::with_pages(three_pages()).fail(2, errors);
    let observer = RecordingObserver::new();

    let outcome = fetcher().fetch_all(&source, &observer).await;

    assert_eq!(ids(&outcome.records), vec![1, 2]);
    assert!(matches!(outcome.halt, HaltReason::Failed { page: 2, .. }));
    // 503 x4, 429, 503: six attempts on page 2
    assert_eq!(source.calls(), vec![1, 2, 2, 2, 2, 2, 2]);
    assert!(observer.events().iter().any(|e| matches!(
        e,
        PipelineEvent::RetriesExhausted { attempts: 5, .. }
    )));
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let source = ScriptedSource::with_pages(three_pages()).fail(
        3,
        [
            Error::Timeout { timeout_ms: 10_000 },
            Error::http_status(502, "bad gateway"),
        ],
    );

    let outcome = fetcher().fetch_all(&source, &NoopObserver).await;

    assert_eq!(ids(&outcome.records), vec![1, 2, 3, 4, 5]);
    assert_eq!(source.calls(), vec![1, 2, 3, 3, 3, 4]);
}

#[tokio::test]
async fn test_transient_errors_exhaust_after_five_attempts() {
    let source = ScriptedSource::with_pages(three_pages())
        .fail(2, (0..5).map(|_| Error::http_status(500, "down")));
    let observer = RecordingObserver::new();

    let outcome = fetcher().fetch_all(&source, &observer).await;

    assert_eq!(ids(&outcome.records), vec![1, 2]);
    assert!(matches!(outcome.halt, HaltReason::Failed { page: 2, .. }));
    assert_eq!(source.calls(), vec![1, 2, 2, 2, 2, 2]);
    assert!(observer.events().iter().any(|e| matches!(
        e,
        PipelineEvent::RetriesExhausted { attempts: 5, .. }
    )));
}

#[tokio::test]
async fn test_permanent_error_keeps_page_one() {
    let source =
        ScriptedSource::with_pages(three_pages()).fail(2, [Error::http_status(404, "gone")]);

    let outcome = fetcher().fetch_all(&source, &NoopObserver).await;

    assert_eq!(ids(&outcome.records), vec![1, 2]);
    assert_eq!(
        outcome.halt,
        HaltReason::Failed {
            page: 2,
            error: "HTTP 404: gone".to_string()
        }
    );
    assert_eq!(source.calls(), vec![1, 2]);
}

#[tokio::test]
async fn test_decode_error_halts_without_retry() {
    let source =
        ScriptedSource::with_pages(three_pages()).fail(1, [Error::decode("invalid JSON body")]);

    let outcome = fetcher().fetch_all(&source, &NoopObserver).await;

    assert!(outcome.is_empty());
    assert!(matches!(outcome.halt, HaltReason::Failed { page: 1, .. }));
    assert_eq!(source.calls(), vec![1]);
}

#[tokio::test]
async fn test_events_follow_the_walk() {
    let source = ScriptedSource::with_pages(vec![vec![json!({"id": 1})]]);
    let observer = RecordingObserver::new();

    fetcher().fetch_all(&source, &observer).await;

    assert_eq!(
        observer.events(),
        vec![
            PipelineEvent::PageRequested { page: 1 },
            PipelineEvent::PageFetched {
                page: 1,
                records: 1,
                total: 1
            },
            PipelineEvent::PageRequested { page: 2 },
            PipelineEvent::FetchHalted {
                reason: HaltReason::Exhausted,
                total: 1
            },
        ]
    );
}

// ============================================================================
// extract_members
// ============================================================================

#[test]
fn test_extract_members() {
    let body = json!({"hydra:member": [{"id": 1}], "hydra:totalItems": 1});
    assert_eq!(
        extract_members(body, DEFAULT_MEMBER_KEY).unwrap(),
        vec![json!({"id": 1})]
    );

    assert!(extract_members(json!({}), DEFAULT_MEMBER_KEY).unwrap().is_empty());
    assert!(extract_members(json!({"hydra:member": []}), DEFAULT_MEMBER_KEY)
        .unwrap()
        .is_empty());
}

#[test]
fn test_extract_members_rejects_malformed_bodies() {
    for body in [
        json!({"hydra:member": {"id": 1}}),
        json!({"hydra:member": null}),
        json!([1, 2]),
        json!("x"),
    ] {
        let err = extract_members(body, DEFAULT_MEMBER_KEY).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(!err.is_retryable());
    }
}

// ============================================================================
// HttpPageSource against a mock server
// ============================================================================

fn http_source(server: &MockServer) -> HttpPageSource {
    let client =
        HttpClient::with_config(HttpClientConfig::builder().base_url(server.uri()).build())
            .unwrap();
    HttpPageSource::new(
        client,
        DEFAULT_COLLECTION_PATH,
        AuthToken::new("tok"),
        "admin",
    )
}

#[tokio::test]
async fn test_http_source_sends_expected_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/histories"))
        .and(query_param("page", "1"))
        .and(header("Authorization", "Bearer tok"))
        .and(header("X-Switch-User", "admin"))
        .and(header("Accept", "application/ld+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hydra:member": [{"id": 1}, {"id": 2}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let members = http_source(&mock_server).fetch_page(1).await.unwrap();
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn test_http_source_custom_member_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/histories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [{"id": 9}]})))
        .mount(&mock_server)
        .await;

    let members = http_source(&mock_server)
        .with_member_key("items")
        .fetch_page(1)
        .await
        .unwrap();
    assert_eq!(members, vec![json!({"id": 9})]);
}

#[tokio::test]
async fn test_fetch_all_over_http_with_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hydra:member": [{"id": 1}]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hydra:member": [{"id": 2}]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hydra:member": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = fetcher()
        .fetch_all(&http_source(&mock_server), &NoopObserver)
        .await;

    assert_eq!(ids(&outcome.records), vec![1, 2]);
    assert_eq!(outcome.halt, HaltReason::Exhausted);
}

#[tokio::test]
async fn test_fetch_all_over_http_malformed_page_is_partial() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hydra:member": [{"id": 1}]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 2}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = fetcher()
        .fetch_all(&http_source(&mock_server), &NoopObserver)
        .await;

    assert_eq!(ids(&outcome.records), vec![1]);
    assert!(matches!(outcome.halt, HaltReason::Failed { page: 2, .. }));
    assert!(!outcome.is_complete());
}
