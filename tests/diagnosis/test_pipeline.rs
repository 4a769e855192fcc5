// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end pipeline tests with in-process collaborators
//!
//! These tests verify that:
//! - A cache miss fetches, analyzes and stores exactly once
//! - A fresh record is served without touching the page source
//! - Anonymous callers get a redacted report, authenticated callers the full one
//! - History is appended for authenticated callers only

use std::time::Duration;

use chrono::Utc;
use webdiag::report::{LIST_MASK_MARKER, MASK_PLACEHOLDER};
use webdiag::{AuthorizationContext, DiagnosisRecord, DiagnosisStore};

use crate::common::{
    FakePageSource, FakeProvider, Harness, PageBehavior, SAMPLE_HTML, SAMPLE_REPORT, TEST_USER,
};

async fn wait_for_history(harness: &Harness, user: &str, expected: usize) -> bool {
    for _ in 0..50 {
        if harness.history.entries_for(user).await.len() >= expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn test_miss_fetches_analyzes_and_stores() {
    let harness = Harness::happy();

    let outcome = harness
        .service
        .diagnose("https://example.com", &AuthorizationContext::authenticated(TEST_USER))
        .await
        .unwrap();

    assert!(!outcome.cached);
    assert_eq!(outcome.result, SAMPLE_REPORT);
    assert_eq!(harness.fetcher.calls(), 1);
    assert_eq!(harness.provider.calls(), 1);

    let prompt = harness.provider.last_prompt().unwrap();
    assert!(prompt.contains("Example"), "title missing from prompt");
    assert!(prompt.contains("Hello"), "heading missing from prompt");

    let stored = harness.store.latest("https://example.com").await.unwrap().unwrap();
    assert_eq!(stored.result, SAMPLE_REPORT);
    assert_eq!(harness.store.len().await, 1);
}

#[tokio::test]
async fn test_fresh_record_served_without_fetch() {
    let harness = Harness::happy();
    harness
        .store
        .insert(DiagnosisRecord::new("https://example.com", SAMPLE_REPORT))
        .await
        .unwrap();

    let outcome = harness
        .service
        .diagnose("example.com", &AuthorizationContext::anonymous())
        .await
        .unwrap();

    assert!(outcome.cached);
    assert!(!outcome.auth.is_authenticated);
    assert_eq!(harness.fetcher.calls(), 0);
    assert_eq!(harness.provider.calls(), 0);
    assert_eq!(harness.store.len().await, 1);

    assert!(outcome.result.contains("## Summary"));
    assert!(outcome.result.contains("Score: 70/100"));
    assert!(outcome.result.contains(MASK_PLACEHOLDER));
    assert!(outcome.result.contains(LIST_MASK_MARKER));
    assert!(!outcome.result.contains("Explain the product in the first paragraph."));
}

#[tokio::test]
async fn test_stale_record_recomputed() {
    let harness = Harness::happy();
    let mut old = DiagnosisRecord::new("https://example.com", "outdated report");
    old.created_at = Utc::now() - chrono::Duration::hours(25);
    harness.store.insert(old).await.unwrap();

    let outcome = harness
        .service
        .diagnose("https://example.com", &AuthorizationContext::authenticated(TEST_USER))
        .await
        .unwrap();

    assert!(!outcome.cached);
    assert_eq!(outcome.result, SAMPLE_REPORT);
    assert_eq!(harness.fetcher.calls(), 1);
    assert_eq!(harness.store.len().await, 2);
}

#[tokio::test]
async fn test_second_request_hits_cache() {
    let harness = Harness::happy();
    let auth = AuthorizationContext::authenticated(TEST_USER);

    let first = harness.service.diagnose("https://example.com/", &auth).await.unwrap();
    let second = harness.service.diagnose("https://EXAMPLE.com#top", &auth).await.unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.result, second.result);
    assert_eq!(harness.fetcher.calls(), 1);
    assert_eq!(harness.provider.calls(), 1);
}

#[tokio::test]
async fn test_anonymous_and_authenticated_views() {
    let harness = Harness::happy();

    let full = harness
        .service
        .diagnose("https://example.com", &AuthorizationContext::authenticated(TEST_USER))
        .await
        .unwrap();
    let redacted = harness
        .service
        .diagnose("https://example.com", &AuthorizationContext::anonymous())
        .await
        .unwrap();

    assert_eq!(full.result, SAMPLE_REPORT);
    assert_ne!(redacted.result, SAMPLE_REPORT);
    assert_eq!(
        redacted.result.split('\n').count(),
        SAMPLE_REPORT.split('\n').count()
    );
}

#[tokio::test]
async fn test_history_recorded_for_authenticated_caller() {
    let harness = Harness::happy();

    harness
        .service
        .diagnose("https://example.com", &AuthorizationContext::authenticated(TEST_USER))
        .await
        .unwrap();
    harness
        .service
        .diagnose("https://example.com", &AuthorizationContext::anonymous())
        .await
        .unwrap();

    assert!(wait_for_history(&harness, TEST_USER, 1).await);
    let entries = harness.history.entries_for(TEST_USER).await;
    assert_eq!(entries[0].url, "https://example.com");
    assert_eq!(entries[0].result, SAMPLE_REPORT);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(harness.history.len().await, 1);
}

#[tokio::test]
async fn test_concurrent_misses_both_compute() {
    let harness = Harness::new(
        FakePageSource::new(
            "slow-direct",
            PageBehavior::Slow(Duration::from_millis(50), SAMPLE_HTML.to_string()),
        ),
        FakeProvider::replying(SAMPLE_REPORT),
    );
    let auth = AuthorizationContext::authenticated(TEST_USER);

    let results = futures::future::join_all(vec![
        harness.service.diagnose("https://example.com", &auth),
        harness.service.diagnose("https://example.com", &auth),
    ])
    .await;

    for result in &results {
        let outcome = result.as_ref().unwrap();
        assert!(!outcome.cached);
        assert_eq!(outcome.result, SAMPLE_REPORT);
    }
    assert_eq!(harness.fetcher.calls(), 2);
    assert_eq!(harness.store.len().await, 2);
}

#[tokio::test]
async fn test_fallback_used_when_direct_fetch_fails() {
    let mut harness = Harness::new(
        FakePageSource::failing(webdiag::scrape::FetchError::HttpError { status: 403 }),
        FakeProvider::replying(SAMPLE_REPORT),
    );
    let fallback = FakePageSource::new("fake-render", PageBehavior::Serve(SAMPLE_HTML.to_string()));
    harness.service = harness.service.with_fallback(fallback.clone());

    let outcome = harness
        .service
        .diagnose("https://example.com", &AuthorizationContext::anonymous())
        .await
        .unwrap();

    assert!(!outcome.cached);
    assert_eq!(harness.fetcher.calls(), 1);
    assert_eq!(fallback.calls(), 1);
    assert_eq!(harness.provider.calls(), 1);
    assert_eq!(harness.store.len().await, 1);
}
