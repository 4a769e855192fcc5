// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Freshness-enforcing front for a diagnosis store

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{DiagnosisRecord, DiagnosisStore};
use crate::store::StoreError;

/// Whether a record created at `created_at` is still fresh at `now`
///
/// The window is inclusive: a record exactly `ttl` old is fresh.
pub fn is_fresh(created_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match chrono::Duration::from_std(ttl) {
        Ok(ttl) => now.signed_duration_since(created_at) <= ttl,
        Err(_) => true,
    }
}

/// Cache lookups and writes that never fail the caller
#[derive(Clone)]
pub struct CacheGateway {
    store: Arc<dyn DiagnosisStore>,
    ttl: Duration,
}

impl CacheGateway {
    pub fn new(store: Arc<dyn DiagnosisStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh record for `key`, or `None` on miss, staleness or store failure
    pub async fn lookup(&self, key: &str) -> Option<DiagnosisRecord> {
        self.lookup_at(key, Utc::now()).await
    }

    /// [`lookup`](Self::lookup) against an explicit clock
    pub async fn lookup_at(&self, key: &str, now: DateTime<Utc>) -> Option<DiagnosisRecord> {
        match self.store.latest(key).await {
            Ok(Some(record)) if is_fresh(record.created_at, now, self.ttl) => Some(record),
            Ok(Some(record)) => {
                debug!(
                    "Ignoring stale cache record for {} (created {})",
                    key, record.created_at
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(
                    store = self.store.name(),
                    error = %e,
                    "Cache lookup failed; treating as miss"
                );
                None
            }
        }
    }

    /// Store a fresh result; returns whether the store acknowledged it
    pub async fn put(&self, key: &str, result: &str) -> bool {
        match self.store.insert(DiagnosisRecord::new(key, result)).await {
            Ok(()) => {
                debug!("Cached diagnosis for {}", key);
                true
            }
            Err(e) => {
                warn!(
                    store = self.store.name(),
                    error = %e,
                    "Cache write failed; continuing without caching"
                );
                false
            }
        }
    }

    /// Delete records older than `retention`
    pub async fn purge_older_than(&self, retention: Duration) -> Result<u64, StoreError> {
        let retention = chrono::Duration::from_std(retention)
            .map_err(|e| StoreError::Unavailable(format!("invalid retention: {}", e)))?;
        self.store.purge_older_than(Utc::now() - retention).await
    }
}
