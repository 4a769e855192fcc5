// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Minimal PostgREST client: select, insert, delete by filter

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::config::StoreConfig;
use super::StoreError;

/// Query parameters in PostgREST filter syntax, e.g. `("url", "eq.https://a")`
pub type Filters = Vec<(&'static str, String)>;

/// HTTP client for a PostgREST-style table API
#[derive(Clone)]
pub struct PostgrestClient {
    client: Client,
    base: String,
    api_key: Option<String>,
}

impl PostgrestClient {
    /// Create a client; requires `config.url`
    pub fn new(config: &StoreConfig) -> anyhow::Result<Self> {
        let base = config
            .url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("STORE_URL is not set"))?
            .trim_end_matches('/')
            .to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base,
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base, table)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    /// `GET /{table}?{filters}`
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &Filters,
    ) -> Result<Vec<T>, StoreError> {
        debug!("Store select from {}", table);
        let request = self.client.get(self.table_url(table)).query(filters);
        let response = send(self.authorize(request)).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// `POST /{table}` with a single row
    pub async fn insert<T: Serialize>(&self, table: &str, row: &T) -> Result<(), StoreError> {
        debug!("Store insert into {}", table);
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(row);
        send(self.authorize(request)).await?;
        Ok(())
    }

    /// `DELETE /{table}?{filters}`, returning the number of rows removed
    pub async fn delete(&self, table: &str, filters: &Filters) -> Result<u64, StoreError> {
        debug!("Store delete from {}", table);
        let request = self
            .client
            .delete(self.table_url(table))
            .query(filters)
            .header("Prefer", "return=representation");
        let response = send(self.authorize(request)).await?;
        let rows = response
            .json::<Vec<serde_json::Value>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(rows.len() as u64)
    }
}

async fn send(request: RequestBuilder) -> Result<Response, StoreError> {
    let response = request
        .send()
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let message: String = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(200)
            .collect();
        return Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}
