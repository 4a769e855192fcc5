// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Language-model analysis of extracted page content
//!
//! `AnalysisClient` bounds the digest, embeds it in a report prompt and makes
//! one call to a `CompletionProvider`. Provider failures arrive already
//! classified as `AnalysisError`.

pub mod client;
pub mod config;
pub mod openai;
pub mod prompt;
pub mod provider;
pub mod types;

pub use client::{AnalysisClient, INPUT_TRUNCATION_NOTICE};
pub use config::AnalysisConfig;
pub use openai::OpenAiCompatibleProvider;
pub use prompt::build_prompt;
pub use provider::CompletionProvider;
pub use types::{AnalysisError, CompletionRequest, PromptStyle};
