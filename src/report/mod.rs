// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Report presentation

pub mod redaction;

pub use redaction::{redact, ReportRedactor, LIST_MASK_MARKER, MASK_PLACEHOLDER};
