// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prompt templates for diagnostic reports
//!
//! Both templates ask for the same markdown layout so report redaction can
//! rely on it: `##` section headings, `Score: NN/100` lines, and per-category
//! subsections whose headings start with "Detail:" so they stay inside the
//! restricted part of the report.

use super::types::PromptStyle;

/// Placeholder replaced by the page digest
const CONTENT_SLOT: &str = "{content}";

const REPORT_LAYOUT: &str = "\
Write the report in markdown using exactly these sections:

## Summary
Two or three sentences on what the page is for and how well it serves that purpose.

## Overall Evaluation
Score: <0-100>/100
Grade: <A-F>
One sentence explaining the grade.

## Detailed Findings
For each category (Content clarity, Structure and navigation, Calls to action, Trust signals, Accessibility) write:
### Detail: <category>
Evaluation: <0-100>/100
Two to four sentences of specific observations quoting the page where useful.

## Improvement Suggestions
A numbered list of at most seven concrete changes, most important first.

Do not add any other sections. Do not wrap the report in a code block.";

const STANDARD_TEMPLATE: &str = "\
You are a website reviewer producing a diagnostic report for the owner of a web page.
The page content below was extracted from its HTML as labeled plain text (title, description, headings, body).

{layout}

Page content:
\"\"\"
{content}
\"\"\"";

const STRUCTURED_TEMPLATE: &str = "\
You are a website reviewer producing a diagnostic report for the owner of a web page.
The page content below was extracted from its HTML with structure markers:
- [H1 heading] to [H6 heading] start a heading of that level
- [List] ... [/List] wrap a list whose items start with \"- \"
- [Table] starts a table; cells are separated by \" | \"
- [Form] marks a form, [Link: target] marks a link, [Image: alt text] marks an image
- [Section: nav] ... [/Section: nav] wrap a semantic section such as nav, header, footer, aside or main
- [Emphasis: text] marks emphasized text
Use these markers to judge hierarchy, navigation, accessibility and calls to action.

{layout}

Page content:
\"\"\"
{content}
\"\"\"";

/// Build the full prompt for a page digest
pub fn build_prompt(style: PromptStyle, content: &str) -> String {
    let template = match style {
        PromptStyle::Standard => STANDARD_TEMPLATE,
        PromptStyle::Structured => STRUCTURED_TEMPLATE,
    };
    // Layout first so a digest containing "{content}" is never re-expanded
    template
        .replace("{layout}", REPORT_LAYOUT)
        .replacen(CONTENT_SLOT, content, 1)
}
