// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-process diagnosis store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{DiagnosisRecord, DiagnosisStore};
use crate::store::StoreError;

/// Records kept in a process-local map; lost on restart
#[derive(Default)]
pub struct MemoryDiagnosisStore {
    records: RwLock<HashMap<String, Vec<DiagnosisRecord>>>,
}

impl MemoryDiagnosisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored records across all URLs
    pub async fn len(&self) -> usize {
        self.records.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DiagnosisStore for MemoryDiagnosisStore {
    async fn latest(&self, url: &str) -> Result<Option<DiagnosisRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .get(url)
            .and_then(|list| list.iter().max_by_key(|r| r.created_at))
            .cloned())
    }

    async fn insert(&self, record: DiagnosisRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .entry(record.url.clone())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let mut removed = 0u64;
        for list in records.values_mut() {
            let before = list.len();
            list.retain(|r| r.created_at >= cutoff);
            removed += (before - list.len()) as u64;
        }
        records.retain(|_, list| !list.is_empty());
        Ok(removed)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
