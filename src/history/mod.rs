// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-user diagnosis history
//!
//! Appends are best-effort and run off the request path: callers hand an
//! entry to [`record_in_background`] and never observe the outcome.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::store::{PostgrestClient, StoreError};

/// One URL/report association for an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user_id: String,
    pub url: String,
    pub result: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(user_id: impl Into<String>, url: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            url: url.into(),
            result: result.into(),
            created_at: Utc::now(),
        }
    }
}

/// Append-only history collaborator
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, entry: HistoryEntry) -> Result<(), StoreError>;

    fn name(&self) -> &'static str;
}

/// Append `entry` on a spawned task, logging failures
pub fn record_in_background(store: Arc<dyn HistoryStore>, entry: HistoryEntry) -> JoinHandle<()> {
    tokio::spawn(async move {
        let user_id = entry.user_id.clone();
        match store.append(entry).await {
            Ok(()) => debug!("Recorded history for user {}", user_id),
            Err(e) => warn!(
                store = store.name(),
                user_id = %user_id,
                error = %e,
                "History append failed"
            ),
        }
    })
}

/// History kept in process memory
#[derive(Default)]
pub struct MemoryHistoryStore {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for one user, oldest first
    pub async fn entries_for(&self, user_id: &str) -> Vec<HistoryEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// History rows in a PostgREST table
///
/// Expected columns: `user_id text`, `url text`, `result text`,
/// `created_at timestamptz`.
pub struct RestHistoryStore {
    client: PostgrestClient,
    table: String,
}

impl RestHistoryStore {
    pub fn new(client: PostgrestClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl HistoryStore for RestHistoryStore {
    async fn append(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        self.client.insert(&self.table, &entry).await
    }

    fn name(&self) -> &'static str {
        "postgrest"
    }
}
