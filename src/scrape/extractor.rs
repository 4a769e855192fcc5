// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTML content extraction
//!
//! Reduces a raw HTML document to a bounded text digest for analysis. Two
//! variants share the same tokenizer, script/style removal and whitespace
//! rules:
//!
//! - [`extract_summary`]: labeled plain-text summary (title, description,
//!   headings, body)
//! - [`extract_structured`]: body text with bracketed structure markers such
//!   as `[H2 heading]`, `[List]` or `[Link: /about]`, so the model can infer
//!   document layout from plain text
//!
//! Neither function fails. If extraction itself breaks, both degrade to a
//! plain tag strip of the raw input.

use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use super::tokenizer::{blank_entities, decode_entities, heading_level, tokenize, Tag, Token};

/// Maximum characters of the plain summary
pub const SUMMARY_MAX_CHARS: usize = 10_000;

/// Maximum characters of the structure-preserving digest
pub const STRUCTURED_MAX_CHARS: usize = 20_000;

/// Appended whenever a digest is cut at its cap
pub const TRUNCATION_NOTICE: &str = "\n\n[Content truncated]";

const SECTIONING_ELEMENTS: &[&str] = &["nav", "header", "footer", "main", "article", "section", "aside"];
const EMPHASIS_ELEMENTS: &[&str] = &["strong", "b", "em", "i", "mark"];
const BLOCK_ELEMENTS: &[&str] = &["p", "div", "br", "blockquote", "pre", "figure", "figcaption", "dl", "dt", "dd"];

/// Text pulled out of one HTML document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: String,
    pub description: String,
    /// `h1`..`h6` text in document order, empty headings dropped
    pub headings: Vec<String>,
    /// Whitespace-collapsed text with scripts, styles and tags removed
    pub body_text: String,
}

impl ExtractedContent {
    /// Labeled summary with empty sections omitted, untruncated
    pub fn summary(&self) -> String {
        let mut sections = Vec::new();
        if !self.title.is_empty() {
            sections.push(format!("Title: {}", self.title));
        }
        if !self.description.is_empty() {
            sections.push(format!("Description: {}", self.description));
        }
        if !self.headings.is_empty() {
            sections.push(format!("Headings: {}", self.headings.join(" | ")));
        }
        if !self.body_text.is_empty() {
            sections.push(format!("Body: {}", self.body_text));
        }
        sections.join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.description.is_empty()
            && self.headings.is_empty()
            && self.body_text.is_empty()
    }
}

/// Extract title, description, headings and body text from HTML
pub fn extract(html: &str) -> ExtractedContent {
    let mut title: Option<String> = None;
    let mut title_buf: Option<String> = None;
    let mut description: Option<String> = None;
    let mut og_description: Option<String> = None;
    let mut headings = Vec::new();
    let mut heading_buf: Option<String> = None;
    let mut body = String::with_capacity(html.len() / 2);

    for token in tokenize(html) {
        match token {
            Token::StartTag(tag) => {
                body.push(' ');
                if tag.name == "title" && title.is_none() && title_buf.is_none() {
                    title_buf = Some(String::new());
                } else if tag.name == "meta" {
                    read_meta_description(&tag, &mut description, &mut og_description);
                } else if tag.heading_level().is_some() && heading_buf.is_none() {
                    heading_buf = Some(String::new());
                }
            }
            Token::EndTag(name) => {
                body.push(' ');
                if name == "title" {
                    if let Some(buf) = title_buf.take() {
                        title = Some(clean_text(&decode_entities(&buf)));
                    }
                } else if heading_level(&name).is_some() {
                    if let Some(buf) = heading_buf.take() {
                        let heading = clean_text(&decode_entities(&buf));
                        if !heading.is_empty() {
                            headings.push(heading);
                        }
                    }
                }
            }
            Token::Text(text) => {
                body.push_str(text);
                if let Some(buf) = title_buf.as_mut() {
                    buf.push_str(text);
                }
                if let Some(buf) = heading_buf.as_mut() {
                    buf.push_str(text);
                }
            }
            Token::RawText(_) | Token::Comment(_) | Token::Declaration(_) => body.push(' '),
        }
    }

    // Unclosed <title> runs to the end of the document
    if title.is_none() {
        if let Some(buf) = title_buf {
            title = Some(clean_text(&decode_entities(&buf)));
        }
    }

    ExtractedContent {
        title: title.unwrap_or_default(),
        description: description.or(og_description).unwrap_or_default(),
        headings,
        body_text: clean_text(&blank_entities(&body)),
    }
}

fn read_meta_description(tag: &Tag<'_>, description: &mut Option<String>, og: &mut Option<String>) {
    let content = match tag.attr("content") {
        Some(content) => clean_text(&decode_entities(content)),
        None => return,
    };
    if content.is_empty() {
        return;
    }
    if description.is_none() && tag.attr("name").is_some_and(|n| n.eq_ignore_ascii_case("description")) {
        *description = Some(content);
    } else if og.is_none() && tag.attr("property").is_some_and(|p| p.eq_ignore_ascii_case("og:description")) {
        *og = Some(content);
    }
}

/// Labeled plain-text summary capped at `max_chars`
pub fn extract_summary(html: &str, max_chars: usize) -> String {
    let summary = panic::catch_unwind(AssertUnwindSafe(|| extract(html).summary())).unwrap_or_else(|_| {
        warn!("Content extraction failed, degrading to plain tag strip");
        plain_text_fallback(html)
    });
    truncate_with_notice(&summary, max_chars)
}

/// Structure-preserving digest capped at `max_chars`
pub fn extract_structured(html: &str, max_chars: usize) -> String {
    let digest = panic::catch_unwind(AssertUnwindSafe(|| render_structured(html))).unwrap_or_else(|_| {
        warn!("Structured extraction failed, degrading to plain tag strip");
        plain_text_fallback(html)
    });
    truncate_with_notice(&digest, max_chars)
}

fn render_structured(html: &str) -> String {
    let content = extract(html);
    let mut out = String::with_capacity(html.len() / 2);
    let mut in_head = false;

    for token in tokenize(html) {
        match token {
            Token::StartTag(tag) => match tag.name.as_str() {
                "head" => in_head = true,
                "body" => in_head = false,
                _ if in_head => {}
                _ => out.push_str(&open_marker(&tag)),
            },
            Token::EndTag(name) => {
                if name == "head" {
                    in_head = false;
                } else if !in_head {
                    out.push_str(&close_marker(&name));
                }
            }
            Token::Text(text) if !in_head => out.push_str(&blank_entities(text)),
            _ => out.push(' '),
        }
    }

    let body = normalize_lines(&out);
    let mut sections = Vec::new();
    if !content.title.is_empty() {
        sections.push(format!("Title: {}", content.title));
    }
    if !content.description.is_empty() {
        sections.push(format!("Description: {}", content.description));
    }
    if !body.is_empty() {
        sections.push(body);
    }
    sections.join("\n\n")
}

fn open_marker(tag: &Tag<'_>) -> String {
    let name = tag.name.as_str();
    if let Some(level) = tag.heading_level() {
        return format!("\n[H{} heading] ", level);
    }
    match name {
        "ul" | "ol" => "\n[List]\n".to_string(),
        "li" => "\n- ".to_string(),
        "table" => "\n[Table]\n".to_string(),
        "tr" => "\n".to_string(),
        "th" | "td" => " | ".to_string(),
        "form" => "\n[Form]\n".to_string(),
        "a" => match tag.attr("href").map(str::trim).filter(|h| !h.is_empty()) {
            Some(href) => format!(" [Link: {}] ", href),
            None => " [Link] ".to_string(),
        },
        "img" => match tag.attr("alt").map(str::trim).filter(|a| !a.is_empty()) {
            Some(alt) => format!(" [Image: {}] ", decode_entities(alt)),
            None => " [Image: no alt text] ".to_string(),
        },
        _ if SECTIONING_ELEMENTS.contains(&name) => format!("\n[Section: {}]\n", name),
        _ if EMPHASIS_ELEMENTS.contains(&name) => " [Emphasis: ".to_string(),
        _ if BLOCK_ELEMENTS.contains(&name) => "\n".to_string(),
        _ => " ".to_string(),
    }
}

fn close_marker(name: &str) -> String {
    if heading_level(name).is_some() {
        return "\n".to_string();
    }
    match name {
        "ul" | "ol" => "\n[/List]\n".to_string(),
        "table" => "\n[/Table]\n".to_string(),
        "form" => "\n[/Form]\n".to_string(),
        "li" | "tr" => "\n".to_string(),
        _ if SECTIONING_ELEMENTS.contains(&name) => format!("\n[/Section: {}]\n", name),
        _ if EMPHASIS_ELEMENTS.contains(&name) => "] ".to_string(),
        _ if BLOCK_ELEMENTS.contains(&name) => "\n".to_string(),
        _ => " ".to_string(),
    }
}

/// Collapse whitespace within each line and drop blank lines
fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(clean_text)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Clean text: normalize whitespace runs to a single space and trim
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Best-effort strip used when extraction breaks
fn plain_text_fallback(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    clean_text(&out)
}

/// Cut `text` to `max_chars` characters and append [`TRUNCATION_NOTICE`]
///
/// Text within the cap is returned unchanged.
pub fn truncate_with_notice(text: &str, max_chars: usize) -> String {
    truncate_chars(text, max_chars, TRUNCATION_NOTICE)
}

/// Cut `text` to `max_chars` characters and append `notice` if anything was cut
pub fn truncate_chars(text: &str, max_chars: usize, notice: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], notice),
        None => text.to_string(),
    }
}
