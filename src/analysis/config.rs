// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the analysis client

use std::env;

use super::types::PromptStyle;

/// Configuration for report generation
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// OpenAI-compatible API base URL
    pub api_base: String,
    /// API key; serving is refused without one
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Upper bound on generated tokens (default: 2000)
    pub max_tokens: u32,
    /// Sampling temperature (default: 0.2)
    pub temperature: f32,
    /// Characters of page digest sent to the model
    pub max_input_chars: usize,
    /// Extractor/prompt pair (default: structured)
    pub prompt_style: PromptStyle,
    /// HTTP timeout for one completion in seconds (default: 45)
    pub timeout_secs: u64,
    /// `ANALYSIS_PROMPT_STYLE` value that named no known style
    pub unrecognized_prompt_style: Option<String>,
}

/// Parse a configured prompt style, keeping the raw value when it is unknown
fn parse_prompt_style(raw: Option<&str>, default: PromptStyle) -> (PromptStyle, Option<String>) {
    match raw {
        None => (default, None),
        Some(value) => match value.parse() {
            Ok(style) => (style, None),
            Err(_) => (default, Some(value.to_string())),
        },
    }
}

impl AnalysisConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let (prompt_style, unrecognized_prompt_style) = parse_prompt_style(
            env::var("ANALYSIS_PROMPT_STYLE").ok().as_deref(),
            defaults.prompt_style,
        );

        Self {
            api_base: env::var("ANALYSIS_API_BASE").unwrap_or(defaults.api_base),
            api_key: env::var("ANALYSIS_API_KEY").ok().filter(|k| !k.is_empty()),
            model: env::var("ANALYSIS_MODEL").unwrap_or(defaults.model),
            max_tokens: env::var("ANALYSIS_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_tokens),
            temperature: env::var("ANALYSIS_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.temperature),
            max_input_chars: env::var("ANALYSIS_MAX_INPUT_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| prompt_style.default_max_input_chars()),
            prompt_style,
            timeout_secs: env::var("ANALYSIS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            unrecognized_prompt_style,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be at least 1".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be between 0.0 and 2.0".to_string());
        }
        if let Some(style) = &self.unrecognized_prompt_style {
            return Err(format!(
                "unknown prompt style '{}' (expected standard or structured)",
                style
            ));
        }
        if self.max_input_chars < 100 {
            return Err("max_input_chars must be at least 100".to_string());
        }
        let extractor_cap = self.prompt_style.extractor_max_chars();
        if self.max_input_chars >= extractor_cap {
            return Err(format!(
                "max_input_chars must be below {} for the {} prompt style",
                extractor_cap, self.prompt_style
            ));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 2000,
            temperature: 0.2,
            max_input_chars: PromptStyle::Structured.default_max_input_chars(),
            prompt_style: PromptStyle::Structured,
            timeout_secs: 45,
            unrecognized_prompt_style: None,
        }
    }
}
