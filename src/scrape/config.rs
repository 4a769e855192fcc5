// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for page fetching
//!
//! Defines settings for the direct fetcher and the optional rendered-fetch
//! fallback service.

use std::env;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; WebDiagBot/1.0; +https://github.com/webdiag/webdiag)";

/// Configuration for the direct page fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for the whole direct fetch in seconds (default: 20)
    pub timeout_secs: u64,
    /// Minimum body length in characters (default: 100)
    pub min_body_chars: usize,
    /// Maximum body size read from the wire (default: 5 MiB)
    pub max_body_bytes: usize,
    /// Redirect hops followed after re-validation (default: 5)
    pub max_redirects: usize,
    /// User-Agent header sent to target sites
    pub user_agent: String,
    /// Fallback rendered-fetch service, disabled when `None`
    pub render_service: Option<RenderServiceConfig>,
}

/// Rendered-fetch fallback service settings
#[derive(Debug, Clone)]
pub struct RenderServiceConfig {
    /// Service endpoint; the target is passed as the `url` query parameter
    pub endpoint: String,
    /// API key passed as the `api_key` query parameter
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 25)
    pub timeout_secs: u64,
}

impl FetchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            min_body_chars: env::var("FETCH_MIN_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_body_chars),
            max_body_bytes: env::var("FETCH_MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
            max_redirects: env::var("FETCH_MAX_REDIRECTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_redirects)
                .min(10), // Cap at 10
            user_agent: env::var("FETCH_USER_AGENT").unwrap_or(defaults.user_agent),
            render_service: RenderServiceConfig::from_env(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be at least 1".to_string());
        }
        if self.max_body_bytes < self.min_body_chars {
            return Err("max_body_bytes must not be smaller than min_body_chars".to_string());
        }
        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".to_string());
        }
        if let Some(render) = &self.render_service {
            render.validate()?;
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            min_body_chars: 100,
            max_body_bytes: 5 * 1024 * 1024,
            max_redirects: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            render_service: None,
        }
    }
}

impl RenderServiceConfig {
    /// Returns `None` unless `RENDER_SERVICE_URL` is set
    pub fn from_env() -> Option<Self> {
        let endpoint = env::var("RENDER_SERVICE_URL").ok()?;
        if endpoint.trim().is_empty() {
            return None;
        }
        Some(Self {
            endpoint,
            api_key: env::var("RENDER_SERVICE_API_KEY").ok().filter(|k| !k.is_empty()),
            timeout_secs: env::var("RENDER_SERVICE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(25),
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.endpoint)
            .map_err(|e| format!("render service endpoint is not a valid URL: {}", e))?;
        if self.timeout_secs == 0 {
            return Err("render service timeout must be at least 1".to_string());
        }
        Ok(())
    }
}
