// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Page retrieval and content extraction
//!
//! ## Architecture
//!
//! ```text
//! raw input → url_guard → PageFetcher ──(error)──→ RenderServiceClient
//!                              ↓                          ↓
//!                            HTML ────────────────────────┘
//!                              ↓
//!                    extractor (tokenizer) → bounded digest
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let url = validate_url("https://example.com")?;
//! let fetcher = PageFetcher::new(FetchConfig::from_env())?;
//! let page = fetcher.fetch(&url).await?;
//! let digest = extract_summary(&page.html, SUMMARY_MAX_CHARS);
//! ```

pub mod config;
pub mod extractor;
pub mod fallback;
pub mod fetcher;
pub mod tokenizer;
pub mod url_guard;

pub use config::{FetchConfig, RenderServiceConfig};
pub use extractor::{
    extract, extract_structured, extract_summary, ExtractedContent, STRUCTURED_MAX_CHARS,
    SUMMARY_MAX_CHARS, TRUNCATION_NOTICE,
};
pub use fallback::RenderServiceClient;
pub use fetcher::{FetchError, HtmlDocument, PageFetcher, PageSource};
pub use url_guard::{validate_url, UrlRejection, ValidatedUrl};
