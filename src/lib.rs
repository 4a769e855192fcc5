// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Web page diagnosis service
//!
//! Accepts a URL, fetches the page behind an SSRF guard, reduces it to a
//! bounded text digest, asks a language model for a diagnostic report,
//! caches the report, and redacts it for callers without full access.

pub mod analysis;
pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod cache;
pub mod cli;
pub mod config;
pub mod diagnosis;
pub mod history;
pub mod report;
pub mod scrape;
pub mod store;
pub mod version;

pub use analysis::{AnalysisClient, AnalysisError, CompletionProvider};
pub use auth::{AuthorizationContext, IdentityVerifier};
pub use cache::{CacheGateway, DiagnosisRecord, DiagnosisStore};
pub use config::ServiceConfig;
pub use diagnosis::{DiagnosisError, DiagnosisOutcome, DiagnosisService};
pub use report::redact;
pub use scrape::{validate_url, PageSource, UrlRejection, ValidatedUrl};
