// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnosis cache
//!
//! Records are keyed by canonical URL and trusted for a fixed freshness
//! window. The store never expires rows itself; freshness is decided on read
//! by [`CacheGateway`], and a periodic cleanup task deletes rows past the
//! retention window.

pub mod cleanup;
pub mod config;
pub mod gateway;
pub mod memory;
pub mod rest;

pub use cleanup::spawn_cleanup_task;
pub use config::CacheConfig;
pub use gateway::{is_fresh, CacheGateway};
pub use memory::MemoryDiagnosisStore;
pub use rest::RestDiagnosisStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// The cached unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    /// Canonical URL, the lookup key
    pub url: String,
    /// Full, unredacted report text
    pub result: String,
    pub created_at: DateTime<Utc>,
}

impl DiagnosisRecord {
    pub fn new(url: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            result: result.into(),
            created_at: Utc::now(),
        }
    }
}

/// Persistent storage for diagnosis records
#[async_trait]
pub trait DiagnosisStore: Send + Sync {
    /// Most recent record for `url` regardless of age
    async fn latest(&self, url: &str) -> Result<Option<DiagnosisRecord>, StoreError>;

    /// Append a record; duplicates per URL are allowed
    async fn insert(&self, record: DiagnosisRecord) -> Result<(), StoreError>;

    /// Delete records created before `cutoff`, returning how many were removed
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Get the store name for logging
    fn name(&self) -> &'static str;
}
