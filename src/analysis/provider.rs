// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Language-model provider trait definition

use async_trait::async_trait;

use super::types::{AnalysisError, CompletionRequest};

/// Trait for implementing completion providers
///
/// Providers turn a prompt into generated text and classify their own
/// failures into [`AnalysisError`]. They never retry on their own.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate text for a prompt
    ///
    /// # Arguments
    /// * `request` - Prompt plus output bounds
    ///
    /// # Returns
    /// Generated text or a classified error
    async fn complete(&self, request: CompletionRequest) -> Result<String, AnalysisError>;

    /// Get the provider name for logging
    fn name(&self) -> &'static str;
}
