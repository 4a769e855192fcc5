// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP surface

pub mod diagnose;
pub mod errors;
pub mod http_server;

pub use diagnose::{diagnose_handler, DiagnoseApiRequest, DiagnoseApiResponse, LivenessResponse};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState, DEFAULT_DIAGNOSE_PATH};
