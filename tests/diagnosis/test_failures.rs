// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Failure handling in the diagnosis pipeline
//!
//! Validation refuses before any network call; retrieval and analysis
//! failures never leave a cache record; store failures are absorbed.

use std::sync::Arc;
use std::time::Duration;

use tokio_test::assert_ok;
use webdiag::cache::CacheGateway;
use webdiag::diagnosis::ErrorClass;
use webdiag::scrape::{FetchError, UrlRejection};
use webdiag::{AnalysisError, AuthorizationContext, DiagnosisError, DiagnosisService};

use crate::common::{
    analysis_client, FailingDiagnosisStore, FakePageSource, FakeProvider, Harness, PageBehavior,
    SAMPLE_HTML, SAMPLE_REPORT, TEST_USER,
};

#[tokio::test]
async fn test_private_targets_never_fetched() {
    let harness = Harness::happy();
    let anonymous = AuthorizationContext::anonymous();

    for url in [
        "http://127.0.0.1/admin",
        "http://localhost:8080",
        "http://10.1.2.3/",
        "http://192.168.0.1",
        "http://169.254.169.254/latest/meta-data",
        "http://[::1]/",
    ] {
        let error = harness.service.diagnose(url, &anonymous).await.unwrap_err();
        assert!(
            matches!(error, DiagnosisError::InvalidUrl(UrlRejection::PrivateNetworkAccess(_))),
            "{} -> {:?}",
            url,
            error
        );
        assert_eq!(error.class(), ErrorClass::SecurityRejection);
        assert_eq!(error.status_code(), 400);
    }

    assert_eq!(harness.fetcher.calls(), 0);
    assert_eq!(harness.provider.calls(), 0);
    assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn test_blank_and_malformed_input() {
    let harness = Harness::happy();
    let anonymous = AuthorizationContext::anonymous();

    let blank = harness.service.diagnose("   ", &anonymous).await.unwrap_err();
    assert_eq!(blank.code(), "INVALID_REQUEST");

    let scheme = harness.service.diagnose("ftp://example.com/file", &anonymous).await.unwrap_err();
    assert_eq!(scheme.code(), "UNSUPPORTED_SCHEME");

    let malformed = harness.service.diagnose("http://", &anonymous).await.unwrap_err();
    assert_eq!(malformed.code(), "MALFORMED_URL");

    assert_eq!(harness.fetcher.calls(), 0);
}

#[tokio::test]
async fn test_retrieval_exhausted_skips_analysis() {
    let mut harness = Harness::new(
        FakePageSource::failing(FetchError::HttpError { status: 500 }),
        FakeProvider::replying(SAMPLE_REPORT),
    );
    let fallback = FakePageSource::new(
        "fake-render",
        PageBehavior::Fail(FetchError::Fallback("render service returned 502".to_string())),
    );
    harness.service = harness.service.with_fallback(fallback.clone());

    let error = harness
        .service
        .diagnose("https://example.com", &AuthorizationContext::anonymous())
        .await
        .unwrap_err();

    assert_eq!(error.status_code(), 422);
    assert_eq!(error.code(), "SCRAPE_ERROR");
    match &error {
        DiagnosisError::Retrieval { primary, fallback } => {
            assert_eq!(primary, &FetchError::HttpError { status: 500 });
            assert!(fallback.is_some());
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(fallback.calls(), 1);
    assert_eq!(harness.provider.calls(), 0);
    assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn test_blocked_redirect_skips_fallback() {
    let mut harness = Harness::new(
        FakePageSource::failing(FetchError::RedirectBlocked(UrlRejection::PrivateNetworkAccess(
            "10.0.0.5 (private)".to_string(),
        ))),
        FakeProvider::replying(SAMPLE_REPORT),
    );
    let fallback = FakePageSource::new("fake-render", PageBehavior::Serve(SAMPLE_HTML.to_string()));
    harness.service = harness.service.with_fallback(fallback.clone());

    let error = harness
        .service
        .diagnose("https://example.com/redirect", &AuthorizationContext::anonymous())
        .await
        .unwrap_err();

    assert!(matches!(error, DiagnosisError::InvalidUrl(UrlRejection::PrivateNetworkAccess(_))));
    assert_eq!(error.class(), ErrorClass::SecurityRejection);
    assert_eq!(error.code(), "PRIVATE_NETWORK_ACCESS");
    assert_eq!(error.status_code(), 400);
    assert!(!error.user_message().contains("10.0.0.5"));
    assert_eq!(fallback.calls(), 0);
    assert_eq!(harness.provider.calls(), 0);
}

#[tokio::test]
async fn test_malformed_redirect_skips_fallback() {
    let mut harness = Harness::new(
        FakePageSource::failing(FetchError::RedirectBlocked(UrlRejection::UnsupportedScheme(
            "ftp".to_string(),
        ))),
        FakeProvider::replying(SAMPLE_REPORT),
    );
    let fallback = FakePageSource::new("fake-render", PageBehavior::Serve(SAMPLE_HTML.to_string()));
    harness.service = harness.service.with_fallback(fallback.clone());

    let error = harness
        .service
        .diagnose("https://example.com/redirect", &AuthorizationContext::anonymous())
        .await
        .unwrap_err();

    assert_eq!(error.code(), "SCRAPE_ERROR");
    assert_eq!(error.status_code(), 422);
    assert_eq!(fallback.calls(), 0);
}

#[tokio::test]
async fn test_empty_page_is_not_analyzed() {
    let harness = Harness::new(FakePageSource::serving(""), FakeProvider::replying(SAMPLE_REPORT));

    let error = harness
        .service
        .diagnose("https://example.com", &AuthorizationContext::anonymous())
        .await
        .unwrap_err();

    assert!(matches!(error, DiagnosisError::NoExtractableContent));
    assert_eq!(error.status_code(), 422);
    assert_eq!(harness.provider.calls(), 0);
    assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn test_rate_limited_analysis_not_cached() {
    let harness = Harness::new(
        FakePageSource::serving(SAMPLE_HTML),
        FakeProvider::failing(AnalysisError::RateLimited {
            retry_after_secs: Some(20),
        }),
    );

    let error = harness
        .service
        .diagnose("https://example.com", &AuthorizationContext::authenticated(TEST_USER))
        .await
        .unwrap_err();

    assert_eq!(error.status_code(), 503);
    assert_eq!(error.code(), "RATE_LIMITED");
    assert!(error.is_retryable());
    assert_eq!(harness.provider.calls(), 1);
    assert!(harness.store.is_empty().await);
    assert_eq!(harness.history.len().await, 0);
}

#[tokio::test]
async fn test_blank_completion_is_an_error() {
    let harness = Harness::new(FakePageSource::serving(SAMPLE_HTML), FakeProvider::replying("  \n "));

    let error = harness
        .service
        .diagnose("https://example.com", &AuthorizationContext::anonymous())
        .await
        .unwrap_err();

    assert!(matches!(error, DiagnosisError::Analysis(AnalysisError::EmptyResponse)));
    assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn test_deadline_exceeded_stores_nothing() {
    let mut harness = Harness::new(
        FakePageSource::new(
            "slow-direct",
            PageBehavior::Slow(Duration::from_millis(500), SAMPLE_HTML.to_string()),
        ),
        FakeProvider::replying(SAMPLE_REPORT),
    );
    harness.service = harness.service.with_deadline(Duration::from_millis(50));

    let error = harness
        .service
        .diagnose("https://example.com", &AuthorizationContext::anonymous())
        .await
        .unwrap_err();

    assert!(matches!(error, DiagnosisError::DeadlineExceeded(_)));
    assert_eq!(error.status_code(), 504);
    assert_eq!(error.code(), "TIMEOUT");
    assert_eq!(harness.provider.calls(), 0);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn test_store_failures_are_not_fatal() {
    let fetcher = FakePageSource::serving(SAMPLE_HTML);
    let provider = FakeProvider::replying(SAMPLE_REPORT);
    let cache = CacheGateway::new(Arc::new(FailingDiagnosisStore), Duration::from_secs(86_400));
    let service = DiagnosisService::new(fetcher.clone(), analysis_client(provider.clone()), cache);

    let auth = AuthorizationContext::authenticated(TEST_USER);
    let first = assert_ok!(service.diagnose("https://example.com", &auth).await);
    let second = assert_ok!(service.diagnose("https://example.com", &auth).await);

    assert!(!first.cached);
    assert!(!second.cached);
    assert_eq!(first.result, SAMPLE_REPORT);
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(provider.calls(), 2);
}
