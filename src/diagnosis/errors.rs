// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnosis failure taxonomy

use std::time::Duration;

use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::scrape::{FetchError, UrlRejection};

/// Broad failure classes shared by every surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed body or URL; the user must fix the input
    ClientInput,
    /// Internal-network target refused
    SecurityRejection,
    /// Page could not be retrieved or yielded nothing readable
    Retrieval,
    /// Language-model service failure
    Analysis,
    /// End-to-end deadline exceeded
    Timeout,
    /// Anything unclassified
    Internal,
}

/// Errors that end a diagnosis request
#[derive(Debug, Clone, Error)]
pub enum DiagnosisError {
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    InvalidUrl(#[from] UrlRejection),

    #[error("Page retrieval failed: {primary}{}", describe_fallback(.fallback))]
    Retrieval {
        primary: FetchError,
        /// `None` when no fallback service is configured
        fallback: Option<FetchError>,
    },

    #[error("Page has no extractable content")]
    NoExtractableContent,

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Request deadline of {}s exceeded", .0.as_secs())]
    DeadlineExceeded(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe_fallback(fallback: &Option<FetchError>) -> String {
    match fallback {
        Some(e) => format!("; fallback: {}", e),
        None => "; no fallback configured".to_string(),
    }
}

impl DiagnosisError {
    pub fn class(&self) -> ErrorClass {
        match self {
            DiagnosisError::InvalidInput(_) => ErrorClass::ClientInput,
            DiagnosisError::InvalidUrl(r) if r.is_security_rejection() => {
                ErrorClass::SecurityRejection
            }
            DiagnosisError::InvalidUrl(_) => ErrorClass::ClientInput,
            DiagnosisError::Retrieval { .. } | DiagnosisError::NoExtractableContent => {
                ErrorClass::Retrieval
            }
            DiagnosisError::Analysis(_) => ErrorClass::Analysis,
            DiagnosisError::DeadlineExceeded(_) => ErrorClass::Timeout,
            DiagnosisError::Internal(_) => ErrorClass::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self.class() {
            ErrorClass::ClientInput | ErrorClass::SecurityRejection => 400,
            ErrorClass::Retrieval => 422,
            ErrorClass::Analysis => 503,
            ErrorClass::Timeout => 504,
            ErrorClass::Internal => 500,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosisError::InvalidInput(_) => "INVALID_REQUEST",
            DiagnosisError::InvalidUrl(UrlRejection::MalformedUrl(_)) => "MALFORMED_URL",
            DiagnosisError::InvalidUrl(UrlRejection::UnsupportedScheme(_)) => "UNSUPPORTED_SCHEME",
            DiagnosisError::InvalidUrl(UrlRejection::PrivateNetworkAccess(_)) => {
                "PRIVATE_NETWORK_ACCESS"
            }
            DiagnosisError::Retrieval { .. } => "SCRAPE_ERROR",
            DiagnosisError::NoExtractableContent => "NO_EXTRACTABLE_CONTENT",
            DiagnosisError::Analysis(e) => e.code(),
            DiagnosisError::DeadlineExceeded(_) => "TIMEOUT",
            DiagnosisError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Fixed sentence for end users; never includes collaborator detail
    pub fn user_message(&self) -> &'static str {
        match self {
            DiagnosisError::InvalidInput(_) => {
                "Please provide a JSON body with a \"url\" field containing the page to diagnose."
            }
            DiagnosisError::InvalidUrl(UrlRejection::MalformedUrl(_)) => {
                "The URL could not be understood. Please check it and try again."
            }
            DiagnosisError::InvalidUrl(UrlRejection::UnsupportedScheme(_)) => {
                "Only http and https URLs can be diagnosed."
            }
            DiagnosisError::InvalidUrl(UrlRejection::PrivateNetworkAccess(_)) => {
                "This URL points to a private or internal network address and cannot be diagnosed."
            }
            DiagnosisError::Retrieval { .. } => {
                "The page could not be retrieved. Please check that the site is publicly reachable and try again."
            }
            DiagnosisError::NoExtractableContent => {
                "The page was retrieved but contained no readable content to analyze."
            }
            DiagnosisError::Analysis(e) => e.user_message(),
            DiagnosisError::DeadlineExceeded(_) => {
                "The diagnosis took too long to complete. Please try again."
            }
            DiagnosisError::Internal(_) => {
                "Something went wrong on our side. Please try again later."
            }
        }
    }

    /// Whether the same request may succeed later
    pub fn is_retryable(&self) -> bool {
        match self {
            DiagnosisError::Analysis(e) => e.is_retryable(),
            DiagnosisError::Retrieval { .. } | DiagnosisError::DeadlineExceeded(_) => true,
            _ => false,
        }
    }
}
