// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI-compatible chat completion provider

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::AnalysisConfig;
use super::provider::CompletionProvider;
use super::types::{AnalysisError, CompletionRequest};

/// Provider for any service speaking the `/chat/completions` protocol
pub struct OpenAiCompatibleProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

// --- OpenAI-compatible wire types ---

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider from analysis configuration
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let endpoint = format!(
            "{}/chat/completions",
            config.api_base.trim_end_matches('/')
        );
        info!(
            "Analysis provider configured: endpoint={}, model={}",
            endpoint, config.model
        );

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AnalysisError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AnalysisError::InvalidCredentials)?;

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!("Analysis POST {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Unknown("analysis request timed out".to_string())
                } else {
                    AnalysisError::Unknown(format!("analysis request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            let error = classify_failure(status.as_u16(), &text, retry_after_secs);
            warn!(
                status = status.as_u16(),
                code = error.code(),
                "Analysis service returned an error"
            );
            return Err(error);
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Unknown(format!("invalid response body: {}", e)))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "openai-compatible"
    }
}

/// Map an error response from the service to a classified failure
pub fn classify_failure(status: u16, body: &str, retry_after_secs: Option<u64>) -> AnalysisError {
    let lowered = body.to_ascii_lowercase();
    match status {
        401 | 403 => AnalysisError::InvalidCredentials,
        402 => AnalysisError::QuotaExceeded,
        429 if lowered.contains("insufficient_quota") => AnalysisError::QuotaExceeded,
        429 => AnalysisError::RateLimited { retry_after_secs },
        _ if lowered.contains("invalid_api_key") => AnalysisError::InvalidCredentials,
        _ => {
            let detail: String = body.chars().take(200).collect();
            AnalysisError::Unknown(format!("HTTP {}: {}", status, detail))
        }
    }
}
