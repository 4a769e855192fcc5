// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Minimal HTML tokenizer
//!
//! Splits markup into text, tag, comment and raw-text tokens in a single
//! forward pass. This is not a tree builder: nesting is left to callers. Every
//! input produces a token stream; markup that cannot be lexed (a stray `<`, an
//! unterminated tag) is emitted as text.

/// Elements whose content is never markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// One lexical unit of an HTML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    StartTag(Tag<'a>),
    /// Closing tag, name lower-cased
    EndTag(String),
    /// Body of a `<script>` or `<style>` element
    RawText(&'a str),
    Comment(&'a str),
    /// `<!DOCTYPE ...>`, `<![CDATA[...]>` or `<?...?>`
    Declaration(&'a str),
}

/// An opening (or self-closing) tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Tag name, lower-cased
    pub name: String,
    pub self_closing: bool,
    raw_attributes: &'a str,
}

impl<'a> Tag<'a> {
    /// All attributes in source order, names lower-cased, values undecoded
    pub fn attributes(&self) -> Vec<(String, &'a str)> {
        parse_attributes(self.raw_attributes)
    }

    /// Value of the first attribute named `name` (ASCII case-insensitive)
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attributes()
            .into_iter()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Heading level for `h1`..`h6`
    pub fn heading_level(&self) -> Option<u8> {
        heading_level(&self.name)
    }
}

/// Heading level for a lower-cased tag name
pub fn heading_level(name: &str) -> Option<u8> {
    match name.as_bytes() {
        [b'h', d @ b'1'..=b'6'] => Some(d - b'0'),
        _ => None,
    }
}

/// Iterator over the tokens of an HTML string
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    raw_text_of: Option<String>,
}

/// Tokenize an HTML document
pub fn tokenize(input: &str) -> Tokenizer<'_> {
    Tokenizer {
        input,
        pos: 0,
        raw_text_of: None,
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if let Some(element) = self.raw_text_of.take() {
            let rest = &self.input[self.pos..];
            let end = find_ignore_ascii_case(rest, &format!("</{}", element)).unwrap_or(rest.len());
            self.pos += end;
            if end > 0 {
                return Some(Token::RawText(&rest[..end]));
            }
        }

        let rest = &self.input[self.pos..];
        if rest.is_empty() {
            return None;
        }

        if rest.starts_with('<') {
            if let Some((token, consumed)) = lex_markup(rest) {
                self.pos += consumed;
                if let Token::StartTag(tag) = &token {
                    if !tag.self_closing && RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) {
                        self.raw_text_of = Some(tag.name.clone());
                    }
                }
                return Some(token);
            }
            // Stray '<' is plain text up to the next candidate
            let end = rest[1..].find('<').map(|i| i + 1).unwrap_or(rest.len());
            self.pos += end;
            return Some(Token::Text(&rest[..end]));
        }

        let end = rest.find('<').unwrap_or(rest.len());
        self.pos += end;
        Some(Token::Text(&rest[..end]))
    }
}

/// Lex one markup construct starting at `<`; `None` means "treat as text"
fn lex_markup(rest: &str) -> Option<(Token<'_>, usize)> {
    let bytes = rest.as_bytes();

    if rest.starts_with("<!--") {
        return Some(match rest[4..].find("-->") {
            Some(i) => (Token::Comment(&rest[4..4 + i]), 4 + i + 3),
            None => (Token::Comment(&rest[4..]), rest.len()),
        });
    }

    if rest.starts_with("<!") || rest.starts_with("<?") {
        return Some(match rest.find('>') {
            Some(i) => (Token::Declaration(&rest[2..i]), i + 1),
            None => (Token::Declaration(&rest[2..]), rest.len()),
        });
    }

    if rest.starts_with("</") {
        let name_end = tag_name_end(bytes, 2)?;
        let close = rest[name_end..].find('>')? + name_end;
        return Some((Token::EndTag(rest[2..name_end].to_ascii_lowercase()), close + 1));
    }

    let name_end = tag_name_end(bytes, 1)?;
    let close = find_tag_close(bytes, name_end)?;
    let inner = rest[name_end..close].trim_end();
    let self_closing = inner.ends_with('/');
    let raw_attributes = inner.trim_end_matches('/');

    Some((
        Token::StartTag(Tag {
            name: rest[1..name_end].to_ascii_lowercase(),
            self_closing,
            raw_attributes,
        }),
        close + 1,
    ))
}

/// End of a tag name starting at `start`; the name must begin with a letter
fn tag_name_end(bytes: &[u8], start: usize) -> Option<usize> {
    if !bytes.get(start)?.is_ascii_alphabetic() {
        return None;
    }
    let len = bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'_'))
        .count();
    Some(start + len)
}

/// Index of the `>` closing a start tag, skipping quoted attribute values
fn find_tag_close(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut last_significant = 0u8;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' if last_significant == b'=' => quote = Some(b),
                b'>' => return Some(i),
                _ => {}
            },
        }
        if quote.is_none() && !b.is_ascii_whitespace() {
            last_significant = b;
        }
    }
    None
}

fn parse_attributes(raw: &str) -> Vec<(String, &str)> {
    let bytes = raw.as_bytes();
    let mut attributes = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        let name_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'/') {
            i += 1;
        }
        if name_start == i {
            i += 1;
            continue;
        }
        let name = raw[name_start..i].to_ascii_lowercase();

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= bytes.len() || bytes[j] != b'=' {
            attributes.push((name, ""));
            continue;
        }
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let value = match bytes.get(j) {
            Some(&q) if q == b'"' || q == b'\'' => {
                let start = j + 1;
                let end = raw[start..].find(q as char).map(|k| start + k).unwrap_or(raw.len());
                i = (end + 1).min(raw.len());
                &raw[start..end]
            }
            Some(_) => {
                let start = j;
                while j < bytes.len() && !bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                i = j;
                &raw[start..j]
            }
            None => {
                i = j;
                ""
            }
        };
        attributes.push((name, value));
    }

    attributes
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Decode the common named and numeric character references
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match entity_at(tail) {
            Some((len, decoded)) => {
                match decoded {
                    Some(c) => out.push(c),
                    None => out.push_str(&tail[..len]),
                }
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Replace every character reference with a single space
pub fn blank_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match entity_at(tail) {
            Some((len, _)) => {
                out.push(' ');
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Recognise `&name;`, `&#123;` or `&#x1F;` at the start of `text`
///
/// Returns the reference length and, when known, the decoded character.
fn entity_at(text: &str) -> Option<(usize, Option<char>)> {
    let semi = text.bytes().take(13).position(|b| b == b';')?;
    if semi < 2 {
        return None;
    }
    let body = &text[1..semi];
    let decoded = if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
                u32::from_str_radix(hex, 16).ok()?
            }
            None if !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()) => num.parse().ok()?,
            _ => return None,
        };
        char::from_u32(code)
    } else if body.chars().all(|c| c.is_ascii_alphanumeric()) {
        match body {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            "mdash" => Some('\u{2014}'),
            "ndash" => Some('\u{2013}'),
            "hellip" => Some('\u{2026}'),
            "copy" => Some('\u{a9}'),
            _ => None,
        }
    } else {
        return None;
    };
    Some((semi + 1, decoded))
}
