// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Rendered-fetch fallback service client
//!
//! Used only after the direct fetch fails. The service receives the target as
//! a query parameter and answers with the page HTML.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use super::config::RenderServiceConfig;
use super::fetcher::{
    check_body_length, check_status, classify_transport_error, read_body_capped, FetchError,
    HtmlDocument, PageSource,
};
use super::url_guard::ValidatedUrl;

/// Client for an external rendering/scraping service
pub struct RenderServiceClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    min_body_chars: usize,
    max_body_bytes: usize,
}

impl RenderServiceClient {
    /// Create a new render service client
    pub fn new(config: &RenderServiceConfig, min_body_chars: usize, max_body_bytes: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Self::with_client(config, client, min_body_chars, max_body_bytes)
    }

    /// Use a prebuilt HTTP client
    pub fn with_client(
        config: &RenderServiceConfig,
        client: Client,
        min_body_chars: usize,
        max_body_bytes: usize,
    ) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)?;

        info!("Render fallback configured: endpoint={}", endpoint);

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            min_body_chars,
            max_body_bytes,
        })
    }

    /// Service URL for a target page
    fn request_url(&self, target: &ValidatedUrl) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("url", target.url().as_str());
            query.append_pair("render", "true");
            if let Some(key) = &self.api_key {
                query.append_pair("api_key", key);
            }
        }
        url
    }
}

#[async_trait]
impl PageSource for RenderServiceClient {
    async fn fetch(&self, url: &ValidatedUrl) -> Result<HtmlDocument, FetchError> {
        debug!("Requesting rendered page for: {}", url);

        let response = self
            .client
            .get(self.request_url(url))
            .send()
            .await
            .map_err(classify_transport_error)?;

        check_status(response.status().as_u16())?;
        let html = read_body_capped(response, self.max_body_bytes).await?;
        check_body_length(&html, self.min_body_chars)?;

        info!("Render service returned {} bytes for: {}", html.len(), url);
        Ok(HtmlDocument {
            final_url: url.url().to_string(),
            html,
            source: self.name(),
        })
    }

    fn name(&self) -> &'static str {
        "render-service"
    }
}
