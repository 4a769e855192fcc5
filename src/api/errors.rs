// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP error responses

use std::fmt;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisError;
use crate::diagnosis::DiagnosisError;

/// Error body: `{ "error": ..., "code": ... }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    /// Pipeline failure, already classified
    Diagnosis(DiagnosisError),
    /// Unsupported method on the diagnose path
    MethodNotAllowed,
    /// Panic or other unclassified failure; detail is logged, not returned
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Diagnosis(e) => e.status_code(),
            ApiError::MethodNotAllowed => 405,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Diagnosis(e) => e.code(),
            ApiError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            ApiError::Diagnosis(e) => e.user_message().to_string(),
            ApiError::MethodNotAllowed => {
                "Method not allowed. Use POST with a JSON body like {\"url\": \"https://example.com\"}."
                    .to_string()
            }
            ApiError::Internal(_) => {
                DiagnosisError::Internal(String::new()).user_message().to_string()
            }
        };
        ErrorResponse {
            error,
            code: self.code().to_string(),
        }
    }

    fn retry_after_secs(&self) -> Option<u64> {
        match self {
            ApiError::Diagnosis(DiagnosisError::Analysis(AnalysisError::RateLimited {
                retry_after_secs,
            })) => *retry_after_secs,
            _ => None,
        }
    }
}

impl From<DiagnosisError> for ApiError {
    fn from(error: DiagnosisError) -> Self {
        ApiError::Diagnosis(error)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Diagnosis(e) => write!(f, "{}", e),
            ApiError::MethodNotAllowed => write!(f, "Method not allowed"),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.to_response())).into_response();

        if matches!(self, ApiError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET, POST"));
        }
        if let Some(secs) = self.retry_after_secs() {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
