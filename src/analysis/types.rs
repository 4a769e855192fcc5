// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for report analysis

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scrape::{STRUCTURED_MAX_CHARS, SUMMARY_MAX_CHARS};

/// One call to the language-model service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Full prompt including the embedded page digest
    pub prompt: String,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature; kept low for repeatable reports
    pub temperature: f32,
}

/// Which extractor/prompt pair drives analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Labeled plain-text summary
    Standard,
    /// Digest with bracketed structure markers
    Structured,
}

impl PromptStyle {
    /// Analysis input cap; always below the matching extractor cap
    pub fn default_max_input_chars(self) -> usize {
        match self {
            PromptStyle::Standard => 8_000,
            PromptStyle::Structured => 16_000,
        }
    }

    /// Digest size produced by the extractor paired with this style
    pub fn extractor_max_chars(self) -> usize {
        match self {
            PromptStyle::Standard => SUMMARY_MAX_CHARS,
            PromptStyle::Structured => STRUCTURED_MAX_CHARS,
        }
    }
}

impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "plain" => Ok(PromptStyle::Standard),
            "structured" | "refined" => Ok(PromptStyle::Structured),
            other => Err(format!("unknown prompt style '{}'", other)),
        }
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptStyle::Standard => write!(f, "standard"),
            PromptStyle::Structured => write!(f, "structured"),
        }
    }
}

/// Classified language-model failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Too many requests; retry after a delay
    #[error("Rate limited by analysis service")]
    RateLimited {
        /// Seconds suggested by the service, if any
        retry_after_secs: Option<u64>,
    },

    /// API key rejected (operator misconfiguration)
    #[error("Analysis service rejected credentials")]
    InvalidCredentials,

    /// Billing or usage quota exhausted
    #[error("Analysis quota exceeded")]
    QuotaExceeded,

    /// Service answered without usable text
    #[error("Analysis service returned no text")]
    EmptyResponse,

    /// Anything else; detail is for logs only
    #[error("Analysis failed: {0}")]
    Unknown(String),
}

impl AnalysisError {
    /// Whether the caller may retry after a delay
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AnalysisError::RateLimited { .. } | AnalysisError::QuotaExceeded
        )
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::RateLimited { .. } => "RATE_LIMITED",
            AnalysisError::InvalidCredentials => "INVALID_CREDENTIALS",
            AnalysisError::QuotaExceeded => "QUOTA_EXCEEDED",
            AnalysisError::EmptyResponse => "EMPTY_RESPONSE",
            AnalysisError::Unknown(_) => "ANALYSIS_ERROR",
        }
    }

    /// Fixed sentence safe to show to end users
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::RateLimited { .. } => {
                "The analysis service is busy right now. Please try again in a minute."
            }
            AnalysisError::InvalidCredentials => {
                "The analysis service is not configured correctly. Please contact the site operator."
            }
            AnalysisError::QuotaExceeded => {
                "The analysis service has reached its usage limit. Please try again later."
            }
            AnalysisError::EmptyResponse => {
                "The analysis service returned an empty report. Please try again."
            }
            AnalysisError::Unknown(_) => {
                "The page could not be analyzed due to a service error. Please try again later."
            }
        }
    }
}
