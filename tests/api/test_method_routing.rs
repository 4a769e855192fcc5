// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Method routing and liveness tests
//!
//! These tests verify that:
//! - GET on the diagnose path and /health return the liveness body
//! - Other methods return 405 with an Allow header
//! - A panicking collaborator yields a 500 JSON error instead of a dropped connection
//! - The diagnose path is configurable

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`
use webdiag::api::{create_app, AppState};
use webdiag::version;

use crate::common::{FakeIdentity, FakePageSource, FakeProvider, Harness, PageBehavior, SAMPLE_REPORT};

fn state_for(harness: Harness) -> AppState {
    AppState::new(Arc::new(harness.service), Arc::new(FakeIdentity))
}

fn request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_get_returns_liveness() {
    let app = create_app(state_for(Harness::happy()));

    for uri in ["/api/diagnose", "/health"] {
        let response = app.clone().oneshot(request(Method::GET, uri, "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);

        let body = json_body(response).await;
        assert_eq!(body["service"], version::SERVICE_NAME);
        assert_eq!(body["version"], version::VERSION_NUMBER);
        assert_eq!(body["status"], "ok");
        assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    }
}

#[tokio::test]
async fn test_unsupported_methods_rejected() {
    let app = create_app(state_for(Harness::happy()));

    for method in [Method::PUT, Method::DELETE, Method::PATCH] {
        let response = app
            .clone()
            .oneshot(request(method.clone(), "/api/diagnose", r#"{"url": "https://example.com"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", method);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
        assert_eq!(json_body(response).await["code"], "METHOD_NOT_ALLOWED");
    }
}

#[tokio::test]
async fn test_cors_preflight_allowed() {
    let app = create_app(state_for(Harness::happy()));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/diagnose")
                .header(header::ORIGIN, "https://app.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_panic_becomes_internal_error() {
    let harness = Harness::new(
        FakePageSource::new("exploding", PageBehavior::Panic),
        FakeProvider::replying(SAMPLE_REPORT),
    );
    let app = create_app(state_for(harness));

    let response = app
        .oneshot(request(Method::POST, "/api/diagnose", r#"{"url": "https://example.com"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert!(!body["error"].as_str().unwrap().contains("exploded"));
}

#[tokio::test]
async fn test_custom_diagnose_path() {
    let state = state_for(Harness::happy()).with_diagnose_path("/v2/check");
    let app = create_app(state);

    let moved = app
        .clone()
        .oneshot(request(Method::POST, "/v2/check", r#"{"url": "https://example.com"}"#))
        .await
        .unwrap();
    assert_eq!(moved.status(), StatusCode::OK);

    let old = app
        .oneshot(request(Method::POST, "/api/diagnose", r#"{"url": "https://example.com"}"#))
        .await
        .unwrap();
    assert_eq!(old.status(), StatusCode::NOT_FOUND);
}
