// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Direct HTTP page fetching
//!
//! Retrieves HTML for a validated URL with a hard timeout. Redirects are not
//! followed by the HTTP client: each `Location` is resolved and passed back
//! through [`validate_url`] before the next hop, so a public URL cannot bounce
//! the fetcher onto an internal address.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{redirect, Client, ClientBuilder, Response};
use thiserror::Error;
use tracing::{debug, info};

use super::config::FetchConfig;
use super::url_guard::{validate_url, UrlRejection, ValidatedUrl};

/// Retrieved HTML document
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    /// URL the body was finally served from (after redirects)
    pub final_url: String,
    pub html: String,
    /// Name of the [`PageSource`] that produced it
    pub source: &'static str,
}

/// Page fetch error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Non-success HTTP status
    #[error("HTTP {status} from target")]
    HttpError { status: u16 },

    /// Content-Type is not text/html
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Body shorter than the configured floor
    #[error("Content too short: {chars} characters")]
    ContentTooShort { chars: usize },

    /// Body larger than the configured cap
    #[error("Response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Connection or protocol failure
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A redirect pointed at a URL the validator refuses
    #[error("Redirect blocked: {0}")]
    RedirectBlocked(UrlRejection),

    /// Redirect chain longer than the configured budget
    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(usize),

    /// Fallback service unusable (misconfigured or returned garbage)
    #[error("Fallback service error: {0}")]
    Fallback(String),
}

/// Anything that can turn a validated URL into an HTML document
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &ValidatedUrl) -> Result<HtmlDocument, FetchError>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Fetches pages directly from the target site
pub struct PageFetcher {
    client: Client,
    config: FetchConfig,
}

impl PageFetcher {
    /// Create a new page fetcher
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Self::client_builder(&config).build()?;
        Ok(Self::with_client(config, client))
    }

    /// HTTP client settings the fetcher relies on
    ///
    /// Automatic redirects are disabled; callers adding resolver overrides
    /// or proxies should start from this builder.
    pub fn client_builder(config: &FetchConfig) -> ClientBuilder {
        Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::none())
    }

    /// Use a prebuilt client, normally one from [`PageFetcher::client_builder`]
    pub fn with_client(config: FetchConfig, client: Client) -> Self {
        Self { client, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn fetch_following_redirects(&self, url: &ValidatedUrl) -> Result<HtmlDocument, FetchError> {
        let mut current = url.url().clone();
        let mut hops = 0usize;

        loop {
            debug!("Fetching page: {}", current);
            let response = self
                .client
                .get(current.clone())
                .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5")
                .send()
                .await
                .map_err(classify_transport_error)?;

            let status = response.status();
            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or(FetchError::HttpError {
                        status: status.as_u16(),
                    })?;

                hops += 1;
                if hops > self.config.max_redirects {
                    return Err(FetchError::TooManyRedirects(self.config.max_redirects));
                }

                let next = current.join(location).map_err(|e| {
                    FetchError::RedirectBlocked(UrlRejection::MalformedUrl(e.to_string()))
                })?;
                let validated = validate_url(next.as_str()).map_err(FetchError::RedirectBlocked)?;
                debug!("Following redirect {} -> {}", current, validated);
                current = validated.url().clone();
                continue;
            }

            check_status(status.as_u16())?;
            check_content_type(
                response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok()),
            )?;

            let html = read_body_capped(response, self.config.max_body_bytes).await?;
            check_body_length(&html, self.config.min_body_chars)?;

            info!("Fetched {} bytes from: {}", html.len(), current);
            return Ok(HtmlDocument {
                final_url: current.to_string(),
                html,
                source: self.name(),
            });
        }
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&self, url: &ValidatedUrl) -> Result<HtmlDocument, FetchError> {
        let limit = Duration::from_secs(self.config.timeout_secs);
        match tokio::time::timeout(limit, self.fetch_following_redirects(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

pub(crate) fn classify_transport_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::NetworkError(error.to_string())
    }
}

/// Require a 2xx status
pub fn check_status(status: u16) -> Result<(), FetchError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(FetchError::HttpError { status })
    }
}

/// Require a Content-Type that includes `text/html`
pub fn check_content_type(content_type: Option<&str>) -> Result<(), FetchError> {
    match content_type {
        Some(ct) if ct.to_ascii_lowercase().contains("text/html") => Ok(()),
        Some(ct) => Err(FetchError::UnsupportedContentType(ct.to_string())),
        None => Err(FetchError::UnsupportedContentType("missing".to_string())),
    }
}

/// Require at least `min_chars` characters of body
pub fn check_body_length(body: &str, min_chars: usize) -> Result<(), FetchError> {
    let chars = body.chars().count();
    if chars < min_chars {
        Err(FetchError::ContentTooShort { chars })
    } else {
        Ok(())
    }
}

/// Read the body in chunks, refusing anything over `limit` bytes
pub(crate) async fn read_body_capped(mut response: Response, limit: usize) -> Result<String, FetchError> {
    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(FetchError::BodyTooLarge { limit });
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(classify_transport_error)? {
        if bytes.len() + chunk.len() > limit {
            return Err(FetchError::BodyTooLarge { limit });
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
