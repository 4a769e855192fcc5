// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnosis orchestrator
//!
//! ```text
//! validate → CacheCheck ─hit──────────────────────────────┐
//!                 └─miss→ Fetching → Extracting → Analyzing → Storing
//!                                                          ↓
//!                                               Redacting → Responding
//! ```
//!
//! Cache and history failures are absorbed. Everything between the cache
//! check and analysis runs under one deadline; storing happens only after
//! the report exists, so an expired deadline never leaves a record behind.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::errors::DiagnosisError;
use crate::analysis::{AnalysisClient, PromptStyle};
use crate::auth::AuthorizationContext;
use crate::cache::CacheGateway;
use crate::history::{record_in_background, HistoryEntry, HistoryStore};
use crate::report::ReportRedactor;
use crate::scrape::{
    extract_structured, extract_summary, validate_url, FetchError, HtmlDocument, PageSource,
    ValidatedUrl, STRUCTURED_MAX_CHARS, SUMMARY_MAX_CHARS,
};

/// Default end-to-end deadline
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Pipeline states, logged on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosisStage {
    CacheCheck,
    CacheHit,
    CacheMiss,
    Fetching,
    Extracting,
    Analyzing,
    Storing,
    Redacting,
    Responding,
}

impl fmt::Display for DiagnosisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosisStage::CacheCheck => "cache_check",
            DiagnosisStage::CacheHit => "cache_hit",
            DiagnosisStage::CacheMiss => "cache_miss",
            DiagnosisStage::Fetching => "fetching",
            DiagnosisStage::Extracting => "extracting",
            DiagnosisStage::Analyzing => "analyzing",
            DiagnosisStage::Storing => "storing",
            DiagnosisStage::Redacting => "redacting",
            DiagnosisStage::Responding => "responding",
        };
        f.write_str(name)
    }
}

/// Successful diagnosis as seen by one caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisOutcome {
    /// Report text, redacted unless the caller has full access
    pub result: String,
    /// Whether the report came from the cache
    pub cached: bool,
    /// Authorization used for redaction
    pub auth: AuthorizationContext,
}

/// Composes validation, cache, retrieval, extraction, analysis and redaction
pub struct DiagnosisService {
    fetcher: Arc<dyn PageSource>,
    fallback: Option<Arc<dyn PageSource>>,
    analysis: AnalysisClient,
    cache: CacheGateway,
    history: Option<Arc<dyn HistoryStore>>,
    redactor: ReportRedactor,
    deadline: Duration,
}

impl DiagnosisService {
    pub fn new(fetcher: Arc<dyn PageSource>, analysis: AnalysisClient, cache: CacheGateway) -> Self {
        Self {
            fetcher,
            fallback: None,
            analysis,
            cache,
            history: None,
            redactor: ReportRedactor::new(),
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Source tried after the direct fetch fails
    pub fn with_fallback(mut self, fallback: Arc<dyn PageSource>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Record successful diagnoses for authenticated callers
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn cache(&self) -> &CacheGateway {
        &self.cache
    }

    /// Whether authenticated diagnoses are appended to a history store
    pub fn records_history(&self) -> bool {
        self.history.is_some()
    }

    /// Diagnose `raw_url` for a caller
    ///
    /// Validation failures return before any network call.
    pub async fn diagnose(
        &self,
        raw_url: &str,
        auth: &AuthorizationContext,
    ) -> Result<DiagnosisOutcome, DiagnosisError> {
        if raw_url.trim().is_empty() {
            return Err(DiagnosisError::InvalidInput(
                "url must be a non-empty string".to_string(),
            ));
        }
        let url = validate_url(raw_url).map_err(|rejection| {
            info!("Rejected URL {:?}: {}", raw_url, rejection);
            DiagnosisError::from(rejection)
        })?;
        let key = url.cache_key();
        let started = Instant::now();

        let (report, cached) = match timeout(self.deadline, self.obtain_report(&url, &key)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    url = %key,
                    deadline_secs = self.deadline.as_secs(),
                    "Diagnosis deadline exceeded"
                );
                return Err(DiagnosisError::DeadlineExceeded(self.deadline));
            }
        };

        if !cached {
            self.transition(DiagnosisStage::Storing, &key);
            self.cache.put(&key, &report).await;
        }

        self.record_history(auth, &key, &report);

        self.transition(DiagnosisStage::Redacting, &key);
        let result = self.redactor.redact(&report, auth.has_full_access);

        self.transition(DiagnosisStage::Responding, &key);
        info!(
            url = %key,
            cached,
            authenticated = auth.is_authenticated,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Diagnosis complete"
        );

        Ok(DiagnosisOutcome {
            result,
            cached,
            auth: auth.clone(),
        })
    }

    /// Cached report if fresh, otherwise a newly computed one
    async fn obtain_report(
        &self,
        url: &ValidatedUrl,
        key: &str,
    ) -> Result<(String, bool), DiagnosisError> {
        self.transition(DiagnosisStage::CacheCheck, key);
        if let Some(record) = self.cache.lookup(key).await {
            self.transition(DiagnosisStage::CacheHit, key);
            return Ok((record.result, true));
        }
        self.transition(DiagnosisStage::CacheMiss, key);

        self.transition(DiagnosisStage::Fetching, key);
        let page = self.retrieve(url).await?;

        self.transition(DiagnosisStage::Extracting, key);
        let digest = match self.analysis.prompt_style() {
            PromptStyle::Standard => extract_summary(&page.html, SUMMARY_MAX_CHARS),
            PromptStyle::Structured => extract_structured(&page.html, STRUCTURED_MAX_CHARS),
        };
        if digest.trim().is_empty() {
            warn!(url = %key, source = page.source, "Page yielded no extractable content");
            return Err(DiagnosisError::NoExtractableContent);
        }
        debug!("Extracted {} chars from {}", digest.chars().count(), page.final_url);

        self.transition(DiagnosisStage::Analyzing, key);
        let report = self.analysis.analyze(&digest).await?;
        Ok((report, false))
    }

    /// Direct fetch, then the fallback source on failure
    pub async fn retrieve(&self, url: &ValidatedUrl) -> Result<HtmlDocument, DiagnosisError> {
        let primary = match self.fetcher.fetch(url).await {
            Ok(page) => return Ok(page),
            Err(e) => e,
        };
        warn!(
            source = self.fetcher.name(),
            url = %url,
            error = %primary,
            "Direct fetch failed"
        );

        // Blocked redirects never reach the fallback; private targets report as the input would
        if let FetchError::RedirectBlocked(rejection) = &primary {
            if rejection.is_security_rejection() {
                return Err(DiagnosisError::InvalidUrl(rejection.clone()));
            }
            return Err(DiagnosisError::Retrieval {
                primary,
                fallback: None,
            });
        }

        let Some(fallback) = &self.fallback else {
            return Err(DiagnosisError::Retrieval {
                primary,
                fallback: None,
            });
        };

        match fallback.fetch(url).await {
            Ok(page) => {
                info!("Fallback {} retrieved {}", fallback.name(), url);
                Ok(page)
            }
            Err(e) => {
                warn!(
                    source = fallback.name(),
                    url = %url,
                    error = %e,
                    "Fallback fetch failed"
                );
                Err(DiagnosisError::Retrieval {
                    primary,
                    fallback: Some(e),
                })
            }
        }
    }

    fn record_history(&self, auth: &AuthorizationContext, key: &str, report: &str) {
        let (Some(history), Some(user_id)) = (&self.history, &auth.user_id) else {
            return;
        };
        if !auth.is_authenticated {
            return;
        }
        record_in_background(history.clone(), HistoryEntry::new(user_id, key, report));
    }

    fn transition(&self, stage: DiagnosisStage, key: &str) {
        debug!(stage = %stage, url = %key, "Diagnosis transition");
    }
}
