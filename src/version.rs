// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the webdiag service

/// Service identity reported by the liveness probe
pub const SERVICE_NAME: &str = "webdiag";

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-diagnosis-pipeline-2026-10-16";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-16";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "ssrf-guard",
    "redirect-revalidation",
    "render-fallback",
    "structured-extraction",
    "diagnosis-cache",
    "anonymous-redaction",
    "jwt-identity",
    "history",
];

/// Get the full version string
pub fn get_version_string() -> String {
    format!("{} ({})", VERSION, BUILD_DATE)
}
