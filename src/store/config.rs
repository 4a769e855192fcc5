// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the record store

use std::env;

/// Configuration for the PostgREST-style record store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// REST root, e.g. `https://db.example.net/rest/v1`; unset selects memory stores
    pub url: Option<String>,
    /// Sent as both `apikey` and bearer token
    pub api_key: Option<String>,
    /// Table holding cached diagnoses (default: diagnoses)
    pub diagnoses_table: String,
    /// Table holding per-user history (default: diagnosis_history)
    pub history_table: String,
    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
}

impl StoreConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env::var("STORE_URL").ok().filter(|v| !v.trim().is_empty()),
            api_key: env::var("STORE_API_KEY").ok().filter(|v| !v.is_empty()),
            diagnoses_table: env::var("STORE_DIAGNOSES_TABLE").unwrap_or(defaults.diagnoses_table),
            history_table: env::var("STORE_HISTORY_TABLE").unwrap_or(defaults.history_table),
            timeout_secs: env::var("STORE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if let Some(url) = &self.url {
            let parsed = url::Url::parse(url).map_err(|e| format!("invalid STORE_URL: {}", e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err("STORE_URL must be http or https".to_string());
            }
        }
        let valid_table =
            |t: &str| !t.is_empty() && t.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_table(&self.diagnoses_table) || !valid_table(&self.history_table) {
            return Err("table names must be non-empty [A-Za-z0-9_]".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }

    /// Whether a remote store is configured
    pub fn is_remote(&self) -> bool {
        self.url.is_some()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            diagnoses_table: "diagnoses".to_string(),
            history_table: "diagnosis_history".to_string(),
            timeout_secs: 10,
        }
    }
}
