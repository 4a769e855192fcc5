// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Direct fetcher tests against a local site
//!
//! These tests verify that:
//! - Redirects are followed hop by hop and the final URL is reported
//! - A redirect onto a private address is refused before it is requested
//! - Redirect chains stop at the configured budget
//! - Oversized and non-HTML bodies are refused
//!
//! The site is bound on loopback and reached as `site.test` through a
//! resolver override, so the target URL itself passes validation.

use std::net::SocketAddr;

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Json, Router,
};
use serde_json::json;
use webdiag::scrape::{validate_url, FetchConfig, FetchError, PageFetcher, PageSource, UrlRejection};

const PAGE: &str = "<html><head><title>Local page</title></head><body><h1>Welcome</h1><p>Enough text to clear the minimum body length for these tests.</p></body></html>";

async fn loop_hop(Path(n): Path<u32>) -> Redirect {
    Redirect::temporary(&format!("/loop/{}", n + 1))
}

fn site() -> Router {
    Router::new()
        .route("/page", get(|| async { Html(PAGE) }))
        .route("/start", get(|| async { Redirect::temporary("/hop") }))
        .route("/hop", get(|| async { Redirect::permanent("/page") }))
        .route(
            "/to-private",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "http://127.0.0.1/")]) }),
        )
        .route(
            "/to-ftp",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "ftp://files.example.com/")]) }),
        )
        .route("/loop/:n", get(loop_hop))
        .route("/big", get(|| async { Html("x".repeat(10_000)) }))
        .route("/data", get(|| async { Json(json!({"page": PAGE})).into_response() }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, Html(PAGE)) }))
}

async fn spawn_site() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, site()).await.unwrap();
    });
    addr
}

fn test_config() -> FetchConfig {
    FetchConfig {
        timeout_secs: 5,
        min_body_chars: 50,
        max_body_bytes: 1000,
        max_redirects: 2,
        ..FetchConfig::default()
    }
}

fn fetcher_for(addr: SocketAddr, config: FetchConfig) -> PageFetcher {
    let client = PageFetcher::client_builder(&config)
        .resolve("site.test", addr)
        .build()
        .unwrap();
    PageFetcher::with_client(config, client)
}

async fn fetch(path: &str) -> Result<webdiag::scrape::HtmlDocument, FetchError> {
    let addr = spawn_site().await;
    let fetcher = fetcher_for(addr, test_config());
    let target = validate_url(&format!("http://site.test:{}{}", addr.port(), path)).unwrap();
    fetcher.fetch(&target).await
}

#[tokio::test]
async fn test_plain_page_fetched() {
    let page = fetch("/page").await.unwrap();
    assert_eq!(page.html, PAGE);
    assert_eq!(page.source, "direct");
    assert!(page.final_url.ends_with("/page"));
}

#[tokio::test]
async fn test_redirects_followed_to_final_page() {
    let page = fetch("/start").await.unwrap();
    assert_eq!(page.html, PAGE);
    assert!(page.final_url.starts_with("http://site.test:"));
    assert!(page.final_url.ends_with("/page"), "{}", page.final_url);
}

#[tokio::test]
async fn test_redirect_to_private_address_blocked() {
    let error = fetch("/to-private").await.unwrap_err();
    assert!(
        matches!(error, FetchError::RedirectBlocked(UrlRejection::PrivateNetworkAccess(_))),
        "{:?}",
        error
    );
}

#[tokio::test]
async fn test_redirect_to_other_scheme_blocked() {
    let error = fetch("/to-ftp").await.unwrap_err();
    assert!(
        matches!(error, FetchError::RedirectBlocked(UrlRejection::UnsupportedScheme(_))),
        "{:?}",
        error
    );
}

#[tokio::test]
async fn test_redirect_budget_enforced() {
    let error = fetch("/loop/0").await.unwrap_err();
    assert_eq!(error, FetchError::TooManyRedirects(2));
}

#[tokio::test]
async fn test_oversized_body_refused() {
    let error = fetch("/big").await.unwrap_err();
    assert_eq!(error, FetchError::BodyTooLarge { limit: 1000 });
}

#[tokio::test]
async fn test_non_html_refused() {
    let error = fetch("/data").await.unwrap_err();
    assert!(matches!(error, FetchError::UnsupportedContentType(ref ct) if ct.contains("json")));
}

#[tokio::test]
async fn test_error_status_reported() {
    let error = fetch("/missing").await.unwrap_err();
    assert_eq!(error, FetchError::HttpError { status: 404 });
}

#[tokio::test]
async fn test_short_body_refused() {
    let addr = spawn_site().await;
    let config = FetchConfig {
        min_body_chars: 900,
        ..test_config()
    };
    let fetcher = fetcher_for(addr, config);
    let target = validate_url(&format!("http://site.test:{}/page", addr.port())).unwrap();

    let error = fetcher.fetch(&target).await.unwrap_err();
    assert_eq!(
        error,
        FetchError::ContentTooShort {
            chars: PAGE.chars().count()
        }
    );
}
