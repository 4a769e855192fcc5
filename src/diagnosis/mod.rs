// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request orchestration and error classification

pub mod errors;
pub mod service;

pub use errors::{DiagnosisError, ErrorClass};
pub use service::{DiagnosisOutcome, DiagnosisService, DiagnosisStage, DEFAULT_DEADLINE};
