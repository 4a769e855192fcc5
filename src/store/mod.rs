// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared plumbing for the external record store
//!
//! The cache and the history log both persist rows through a PostgREST-style
//! HTTP API. Without `STORE_URL` both fall back to in-process memory stores.

pub mod config;
pub mod postgrest;

pub use config::StoreConfig;
pub use postgrest::PostgrestClient;

use thiserror::Error;

/// Errors from a record store
///
/// These never reach API callers; the orchestrator absorbs them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Store returned undecodable data: {0}")]
    Decode(String),
}
