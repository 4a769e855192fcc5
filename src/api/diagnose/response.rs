// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnosis API response types

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::diagnosis::DiagnosisOutcome;
use crate::version;

/// Response body for a successful diagnosis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnoseApiResponse {
    /// Report text, redacted for callers without full access
    pub result: String,

    /// Whether the report was served from cache
    pub cached: bool,

    pub is_authenticated: bool,

    pub has_full_access: bool,
}

impl From<DiagnosisOutcome> for DiagnoseApiResponse {
    fn from(outcome: DiagnosisOutcome) -> Self {
        Self {
            result: outcome.result,
            cached: outcome.cached,
            is_authenticated: outcome.auth.is_authenticated,
            has_full_access: outcome.auth.has_full_access,
        }
    }
}

/// Liveness probe body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LivenessResponse {
    pub service: String,
    pub version: String,
    pub status: String,
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
}

impl LivenessResponse {
    pub fn now() -> Self {
        Self {
            service: version::SERVICE_NAME.to_string(),
            version: version::VERSION_NUMBER.to_string(),
            status: "ok".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
