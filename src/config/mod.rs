// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration loaded from the environment
//!
//! Each component owns its config struct; [`ServiceConfig`] collects them so
//! binaries validate everything once at startup.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::analysis::AnalysisConfig;
use crate::api::DEFAULT_DIAGNOSE_PATH;
use crate::auth::AuthConfig;
use crate::cache::CacheConfig;
use crate::scrape::FetchConfig;
use crate::store::StoreConfig;

/// HTTP listener and request settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path of the diagnose endpoint (default: /api/diagnose)
    pub diagnose_path: String,
    /// End-to-end deadline for one diagnosis in seconds (default: 30)
    pub deadline_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("API_HOST").unwrap_or(defaults.host),
            port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            diagnose_path: env::var("DIAGNOSE_PATH").unwrap_or(defaults.diagnose_path),
            deadline_secs: env::var("REQUEST_DEADLINE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.deadline_secs),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if !self.diagnose_path.starts_with('/') || self.diagnose_path.len() < 2 {
            return Err("diagnose_path must start with '/' and not be the root".to_string());
        }
        if self.diagnose_path == "/health" {
            return Err("diagnose_path must not shadow /health".to_string());
        }
        if self.deadline_secs == 0 {
            return Err("deadline_secs must be at least 1".to_string());
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("invalid listen address {}:{}: {}", self.host, self.port, e))
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            diagnose_path: DEFAULT_DIAGNOSE_PATH.to_string(),
            deadline_secs: 30,
        }
    }
}

/// All component configuration
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub fetch: FetchConfig,
    pub analysis: AnalysisConfig,
    pub cache: CacheConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
}

impl ServiceConfig {
    /// Load every component configuration from the environment
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            fetch: FetchConfig::from_env(),
            analysis: AnalysisConfig::from_env(),
            cache: CacheConfig::from_env(),
            store: StoreConfig::from_env(),
            auth: AuthConfig::from_env(),
        }
    }

    /// Validate every component, naming the first one that fails
    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, Result<(), String>); 6] = [
            ("server", self.server.validate()),
            ("fetch", self.fetch.validate()),
            ("analysis", self.analysis.validate()),
            ("cache", self.cache.validate()),
            ("store", self.store.validate()),
            ("auth", self.auth.validate()),
        ];
        for (component, result) in checks {
            result.map_err(|e| anyhow!("invalid {} configuration: {}", component, e))?;
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), and also require an analysis key
    pub fn validate_for_serving(&self) -> Result<()> {
        self.validate()?;
        if !self.analysis.has_api_key() {
            return Err(anyhow!("ANALYSIS_API_KEY must be set to serve diagnoses"));
        }
        Ok(())
    }
}
