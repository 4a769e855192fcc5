// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnosis API endpoint
//!
//! `POST` runs a diagnosis, `GET` is a liveness probe, anything else is 405.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{diagnose_handler, liveness_handler, method_not_allowed_handler};
pub use request::DiagnoseApiRequest;
pub use response::{DiagnoseApiResponse, LivenessResponse};
