// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnosis store backed by a PostgREST table
//!
//! Expected columns: `url text`, `result text`, `created_at timestamptz`.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use super::{DiagnosisRecord, DiagnosisStore};
use crate::store::postgrest::Filters;
use crate::store::{PostgrestClient, StoreError};

pub struct RestDiagnosisStore {
    client: PostgrestClient,
    table: String,
}

impl RestDiagnosisStore {
    pub fn new(client: PostgrestClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

/// Filters selecting the newest row for a URL
pub(crate) fn latest_filters(url: &str) -> Filters {
    vec![
        ("select", "url,result,created_at".to_string()),
        ("url", format!("eq.{}", url)),
        ("order", "created_at.desc".to_string()),
        ("limit", "1".to_string()),
    ]
}

/// Filters selecting rows created before `cutoff`
pub(crate) fn purge_filters(cutoff: DateTime<Utc>) -> Filters {
    vec![(
        "created_at",
        format!("lt.{}", cutoff.to_rfc3339_opts(SecondsFormat::Secs, true)),
    )]
}

#[async_trait]
impl DiagnosisStore for RestDiagnosisStore {
    async fn latest(&self, url: &str) -> Result<Option<DiagnosisRecord>, StoreError> {
        let rows: Vec<DiagnosisRecord> = self
            .client
            .select(&self.table, &latest_filters(url))
            .await?;
        Ok(rows.into_iter().max_by_key(|r| r.created_at))
    }

    async fn insert(&self, record: DiagnosisRecord) -> Result<(), StoreError> {
        self.client.insert(&self.table, &record).await
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        self.client.delete(&self.table, &purge_filters(cutoff)).await
    }

    fn name(&self) -> &'static str {
        "postgrest"
    }
}
