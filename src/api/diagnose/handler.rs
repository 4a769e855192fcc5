// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnosis API endpoint handlers

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::{debug, error, info, warn};

use super::request::DiagnoseApiRequest;
use super::response::{DiagnoseApiResponse, LivenessResponse};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::auth::{bearer_token, resolve_context};
use crate::diagnosis::{DiagnosisError, ErrorClass};

/// POST - Diagnose a web page
///
/// # Request
/// - `url`: Page to diagnose (required; `https://` is assumed if no scheme)
/// - `Authorization: Bearer <token>` header (optional)
///
/// # Response
/// - `result`: Report text, redacted for anonymous callers
/// - `cached`: Whether the report came from cache
/// - `isAuthenticated`, `hasFullAccess`: Authorization used for redaction
///
/// # Errors
/// - 400 Bad Request: Malformed body or URL, or private network target
/// - 422 Unprocessable Entity: Page could not be retrieved or had no content
/// - 503 Service Unavailable: Analysis service failure
/// - 504 Gateway Timeout: Deadline exceeded
/// - 500 Internal Server Error: Anything else
pub async fn diagnose_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DiagnoseApiResponse>, ApiError> {
    let request = DiagnoseApiRequest::parse(&body).map_err(|e| {
        warn!("Diagnose request rejected: {}", e);
        ApiError::from(DiagnosisError::InvalidInput(e))
    })?;
    debug!("Diagnose request: {:?}", request.url);

    let auth = resolve_context(state.identity.as_ref(), bearer_token(&headers)).await;

    let outcome = state
        .service
        .diagnose(&request.url, &auth)
        .await
        .map_err(|e| {
            match e.class() {
                ErrorClass::Internal => error!(error = %e, "Diagnosis failed"),
                ErrorClass::ClientInput | ErrorClass::SecurityRejection => {
                    info!(code = e.code(), error = %e, "Diagnosis refused")
                }
                _ => warn!(code = e.code(), error = %e, "Diagnosis failed"),
            }
            ApiError::from(e)
        })?;

    Ok(Json(DiagnoseApiResponse::from(outcome)))
}

/// GET - Liveness probe
pub async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse::now())
}

/// Any other method on the diagnose path
pub async fn method_not_allowed_handler() -> ApiError {
    ApiError::MethodNotAllowed
}
