// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Report redaction for anonymous callers
//!
//! A single pass over the report lines with one piece of state: whether the
//! current section is restricted. Headings and score lines always pass
//! through; headings also decide whether the following section is
//! restricted. Restricted list items keep a short prefix, other restricted
//! lines become a fixed placeholder.

use std::sync::OnceLock;

use regex::Regex;

/// Replaces a restricted prose line
pub const MASK_PLACEHOLDER: &str = "[Sign in to view the full details]";

/// Appended to the visible prefix of a restricted list item
pub const LIST_MASK_MARKER: &str = "… [sign in to read more]";

/// Heading keywords that start a restricted section
const RESTRICTED_KEYWORDS: &[&str] = &[
    "detail",
    "improvement",
    "suggestion",
    "specific",
    "recommendation",
    "action",
];

/// Visible characters kept from a restricted list item
const LIST_PREFIX_CHARS: usize = 12;

/// Redaction state between lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Open,
    Restricted,
}

/// Line-oriented report redactor
pub struct ReportRedactor {
    score_pattern: Regex,
    list_item_pattern: Regex,
    heading_pattern: Regex,
    restricted_pattern: Regex,
}

impl Default for ReportRedactor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRedactor {
    pub fn new() -> Self {
        Self {
            // Percentages, NN/100, explicit score/evaluation/rating labels,
            // and letter grades after a grade/rank label
            score_pattern: Regex::new(
                r"(?ix)
                \b\d{1,3}(?:\.\d+)?\s?% |
                \b\d{1,3}(?:\.\d+)?\s?/\s?(?:10|100)\b |
                \b(?:score|evaluation|rating)\s*[:：] |
                \b(?:grade|rank)\b\s*[:：]?\s*(?-i:[A-F])[+-]?(?:\s|$|[.,;)])
                ",
            )
            .unwrap(),
            list_item_pattern: Regex::new(r"^\s*(?:[-*+•]|\d+[.)])\s+").unwrap(),
            heading_pattern: Regex::new(r"^\s{0,3}#{1,6}(?:\s|$)").unwrap(),
            // Keywords must start a word: "Actionable" counts, "Satisfaction" does not
            restricted_pattern: Regex::new(&format!(
                r"(?i)\b(?:{})",
                RESTRICTED_KEYWORDS.join("|")
            ))
            .unwrap(),
        }
    }

    /// Return `report` unchanged when authorized, otherwise redacted
    pub fn redact(&self, report: &str, authorized: bool) -> String {
        if authorized {
            return report.to_string();
        }

        let mut section = Section::Open;
        report
            .split('\n')
            .map(|line| {
                if self.heading_pattern.is_match(line) {
                    section = if self.restricted_pattern.is_match(line) {
                        Section::Restricted
                    } else {
                        Section::Open
                    };
                    return line.to_string();
                }
                if section == Section::Open
                    || line.trim().is_empty()
                    || self.score_pattern.is_match(line)
                {
                    return line.to_string();
                }
                self.mask_line(line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn mask_line(&self, line: &str) -> String {
        match self.list_item_pattern.find(line) {
            Some(marker) => {
                let item = &line[marker.end()..];
                let keep = LIST_PREFIX_CHARS.min(item.chars().count() / 2);
                let prefix: String = item.chars().take(keep).collect();
                format!("{}{}{}", marker.as_str(), prefix.trim_end(), LIST_MASK_MARKER)
            }
            None => MASK_PLACEHOLDER.to_string(),
        }
    }
}

/// Redact with the shared default redactor
pub fn redact(report: &str, authorized: bool) -> String {
    static REDACTOR: OnceLock<ReportRedactor> = OnceLock::new();
    REDACTOR.get_or_init(ReportRedactor::new).redact(report, authorized)
}
