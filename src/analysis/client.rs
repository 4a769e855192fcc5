// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analysis client: page digest in, diagnostic report out

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::config::AnalysisConfig;
use super::prompt::build_prompt;
use super::provider::CompletionProvider;
use super::types::{AnalysisError, CompletionRequest, PromptStyle};
use crate::scrape::extractor::truncate_chars;

/// Appended when the digest is cut to the analysis input cap
pub const INPUT_TRUNCATION_NOTICE: &str = "\n\n[Content truncated for analysis]";

/// Turns extracted page content into a report via a completion provider
#[derive(Clone)]
pub struct AnalysisClient {
    provider: Arc<dyn CompletionProvider>,
    config: AnalysisConfig,
}

impl AnalysisClient {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: AnalysisConfig) -> Self {
        Self { provider, config }
    }

    /// Extractor/prompt pair this client expects
    pub fn prompt_style(&self) -> PromptStyle {
        self.config.prompt_style
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Bound the digest to the configured input cap
    pub fn prepare_input(&self, content: &str) -> String {
        truncate_chars(content, self.config.max_input_chars, INPUT_TRUNCATION_NOTICE)
    }

    /// Generate a diagnostic report for extracted page content
    ///
    /// Exactly one provider call is made. Blank output is an
    /// [`AnalysisError::EmptyResponse`].
    pub async fn analyze(&self, content: &str) -> Result<String, AnalysisError> {
        let input = self.prepare_input(content);
        let request = CompletionRequest {
            prompt: build_prompt(self.config.prompt_style, &input),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(
            "Analyzing {} chars with {} ({} prompt)",
            input.chars().count(),
            self.provider.name(),
            self.config.prompt_style
        );

        let start = Instant::now();
        let text = match self.provider.complete(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    code = e.code(),
                    error = %e,
                    "Analysis failed"
                );
                return Err(e);
            }
        };

        let report = text.trim();
        if report.is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }

        info!(
            "Analysis complete via {} in {}ms ({} chars)",
            self.provider.name(),
            start.elapsed().as_millis(),
            report.len()
        );
        Ok(report.to_string())
    }
}
