// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /api/diagnose tests
//!
//! These tests verify that:
//! - A valid request returns the report with cache and auth flags
//! - A bearer token unlocks the full report; a bad one is ignored
//! - Each failure class maps to its status code and error code
//! - Rate limits carry a Retry-After header

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`
use webdiag::api::{create_app, AppState};
use webdiag::report::MASK_PLACEHOLDER;
use webdiag::scrape::FetchError;
use webdiag::AnalysisError;

use crate::common::{
    FakeIdentity, FakePageSource, FakeProvider, Harness, SAMPLE_HTML, SAMPLE_REPORT, VALID_TOKEN,
};

fn app_for(harness: Harness) -> Router {
    let state = AppState::new(Arc::new(harness.service), Arc::new(FakeIdentity));
    create_app(state)
}

fn post(body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/diagnose")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_authenticated_request_gets_full_report() {
    let app = app_for(Harness::happy());

    let response = app
        .oneshot(post(r#"{"url": "https://example.com"}"#, Some(VALID_TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["result"], SAMPLE_REPORT);
    assert_eq!(body["cached"], false);
    assert_eq!(body["isAuthenticated"], true);
    assert_eq!(body["hasFullAccess"], true);
}

#[tokio::test]
async fn test_anonymous_request_gets_redacted_report() {
    let app = app_for(Harness::happy());

    let response = app
        .oneshot(post(r#"{"url": "example.com"}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let result = body["result"].as_str().unwrap();
    assert!(result.contains("## Summary"));
    assert!(result.contains(MASK_PLACEHOLDER));
    assert_eq!(body["isAuthenticated"], false);
    assert_eq!(body["hasFullAccess"], false);
}

#[tokio::test]
async fn test_invalid_token_treated_as_anonymous() {
    let app = app_for(Harness::happy());

    let response = app
        .oneshot(post(r#"{"url": "https://example.com"}"#, Some("forged")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["isAuthenticated"], false);
    assert_ne!(body["result"], SAMPLE_REPORT);
}

#[tokio::test]
async fn test_second_request_reports_cached() {
    let app = app_for(Harness::happy());

    let first = app
        .clone()
        .oneshot(post(r#"{"url": "https://example.com"}"#, None))
        .await
        .unwrap();
    assert_eq!(json_body(first).await["cached"], false);

    let second = app
        .oneshot(post(r#"{"url": "https://example.com/"}"#, None))
        .await
        .unwrap();
    assert_eq!(json_body(second).await["cached"], true);
}

#[tokio::test]
async fn test_malformed_bodies_rejected() {
    for body in [
        "",
        "not json",
        "{}",
        r#"{"url": ""}"#,
        r#"{"url": 42}"#,
        r#"["https://example.com"]"#,
    ] {
        let app = app_for(Harness::happy());
        let response = app.oneshot(post(body, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {:?}", body);
        let json = json_body(response).await;
        assert_eq!(json["code"], "INVALID_REQUEST");
        assert!(json["error"].as_str().unwrap().contains("url"));
    }
}

#[tokio::test]
async fn test_private_network_target_rejected() {
    let harness = Harness::happy();
    let fetcher = harness.fetcher.clone();
    let app = app_for(harness);

    let response = app
        .oneshot(post(r#"{"url": "http://169.254.169.254/latest"}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], "PRIVATE_NETWORK_ACCESS");
    assert!(!json["error"].as_str().unwrap().contains("169.254"));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_unreachable_page_is_unprocessable() {
    let app = app_for(Harness::new(
        FakePageSource::failing(FetchError::NetworkError("dns error: nowhere.invalid".into())),
        FakeProvider::replying(SAMPLE_REPORT),
    ));

    let response = app
        .oneshot(post(r#"{"url": "https://nowhere.invalid"}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(response).await;
    assert_eq!(json["code"], "SCRAPE_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("dns error"));
}

#[tokio::test]
async fn test_rate_limit_maps_to_service_unavailable() {
    let app = app_for(Harness::new(
        FakePageSource::serving(SAMPLE_HTML),
        FakeProvider::failing(AnalysisError::RateLimited {
            retry_after_secs: Some(30),
        }),
    ));

    let response = app
        .oneshot(post(r#"{"url": "https://example.com"}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers()[header::RETRY_AFTER], "30");
    assert_eq!(json_body(response).await["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn test_bad_credentials_maps_to_service_unavailable() {
    let app = app_for(Harness::new(
        FakePageSource::serving(SAMPLE_HTML),
        FakeProvider::failing(AnalysisError::InvalidCredentials),
    ));

    let response = app
        .oneshot(post(r#"{"url": "https://example.com"}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.headers().get(header::RETRY_AFTER).is_none());
    assert_eq!(json_body(response).await["code"], "INVALID_CREDENTIALS");
}
