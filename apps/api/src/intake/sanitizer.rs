//! Sanitizer — turns untrusted fetched markup into bounded plain text.
//!
//! Rules, in order:
//! 1. Drop `<head>`, comments, and every element in `BLOCKED_ELEMENTS` together with its
//!    content, in a single left-to-right pass.
//! 2. Strip remaining tags and decode common entities.
//! 3. Collapse whitespace runs to one space and trim.
//! 4. Truncate to `MAX_SAFE_CHARS` characters plus `TRUNCATION_MARKER`.
//! 5. Reject anything of `MIN_USABLE_CHARS` characters or fewer.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::profile::{ProfileInput, Provenance, SanitizedText};

pub const MAX_SAFE_CHARS: usize = 15_000;
pub const MIN_USABLE_CHARS: usize = 200;
pub const TRUNCATION_MARKER: &str = "...[TRUNCATED_FOR_SAFETY]";

const BLOCKED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "iframe", "object", "embed", "form", "input", "button",
];

/// Elements whose content runs to end of document when the close tag is missing.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "iframe"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("Insufficient content after sanitization: {length} characters (need more than {MIN_USABLE_CHARS})")]
    InsufficientContent { length: usize },
}

/// Rest of an open tag after its name. Quoted attribute values may contain `>`.
const OPEN_TAG_TAIL: &str = r#"(?:"[^"]*"|'[^']*'|[^'">])*>"#;

/// Everything dropped along with its content, as one alternation. Leftmost-first
/// matching means whichever construct opens first in the document wins, so a
/// `<!--` inside a script string cannot swallow the closing `</script>`.
static DROPPED: Lazy<Regex> = Lazy::new(|| {
    let mut alternatives = vec![
        r"<!--.*?(?:-->|\z)".to_string(),
        format!(r"<head\b{OPEN_TAG_TAIL}.*?</head\s*>"),
    ];
    for tag in BLOCKED_ELEMENTS {
        alternatives.push(format!(r"<{tag}\b{OPEN_TAG_TAIL}.*?</{tag}\s*>"));
    }
    // Tried after the closed form at the same position.
    for tag in RAW_TEXT_ELEMENTS {
        alternatives.push(format!(r"<{tag}\b{OPEN_TAG_TAIL}.*\z"));
    }
    element_pattern(&format!("(?is){}", alternatives.join("|")))
});

static ANY_TAG: Lazy<Regex> =
    Lazy::new(|| element_pattern(&format!(r"(?s)<[A-Za-z/!?]{OPEN_TAG_TAIL}")));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| element_pattern(r"\s+"));

fn element_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).expect("sanitizer patterns are static and valid")
}

/// Sanitizes untrusted markup or text into `SanitizedText`.
pub fn sanitize(raw: &str) -> Result<SanitizedText, SanitizeError> {
    let mut text = DROPPED.replace_all(raw, "").into_owned();
    text = ANY_TAG.replace_all(&text, "").into_owned();
    text = decode_entities(&text);
    let collapsed = WHITESPACE.replace_all(&text, " ");
    let text = collapsed.trim();

    let length = text.chars().count();
    let text = if length > MAX_SAFE_CHARS {
        let mut kept: String = text.chars().take(MAX_SAFE_CHARS).collect();
        kept.push_str(TRUNCATION_MARKER);
        kept
    } else {
        text.to_string()
    };

    if length <= MIN_USABLE_CHARS {
        return Err(SanitizeError::InsufficientContent { length });
    }

    Ok(SanitizedText::new_unchecked(text))
}

/// Passes trusted text through unchanged and sanitizes everything else.
pub fn prepare(input: &ProfileInput) -> Result<SanitizedText, SanitizeError> {
    match input.provenance() {
        Provenance::Trusted => Ok(SanitizedText::new_unchecked(input.text().to_string())),
        Provenance::UntrustedScraped => sanitize(input.text()),
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    // &amp; last so "&amp;lt;" decodes to "&lt;" and not "<".
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
