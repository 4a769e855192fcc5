// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the diagnosis cache

use std::env;
use std::time::Duration;

/// Freshness and retention settings
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Freshness window in seconds (default: 86400 = 24h)
    pub ttl_secs: u64,
    /// Records older than this are purged (default: 7 days)
    pub retention_days: u32,
    /// Cleanup task period in seconds; 0 disables the task (default: 3600)
    pub cleanup_interval_secs: u64,
}

impl CacheConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_secs: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ttl_secs),
            retention_days: env::var("CACHE_RETENTION_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retention_days),
            cleanup_interval_secs: env::var("CACHE_CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval_secs),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.ttl_secs == 0 {
            return Err("ttl_secs must be at least 1".to_string());
        }
        if self.retention_days == 0 {
            return Err("retention_days must be at least 1".to_string());
        }
        if u64::from(self.retention_days) * 86_400 < self.ttl_secs {
            return Err("retention window must not be shorter than the freshness window".to_string());
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(u64::from(self.retention_days) * 86_400)
    }

    /// Cleanup period, or `None` when disabled
    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval_secs > 0).then(|| Duration::from_secs(self.cleanup_interval_secs))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 86_400,
            retention_days: 7,
            cleanup_interval_secs: 3_600,
        }
    }
}
