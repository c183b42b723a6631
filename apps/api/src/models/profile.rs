/// Where the profile text came from. Scraped text is untrusted and must be
/// sanitized before it reaches the analysis chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Trusted,
    UntrustedScraped,
}

/// Raw career text as captured from the caller or a fetched page.
#[derive(Debug, Clone)]
pub struct ProfileInput {
    text: String,
    provenance: Provenance,
}

impl ProfileInput {
    pub fn trusted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provenance: Provenance::Trusted,
        }
    }

    pub fn scraped(html: impl Into<String>) -> Self {
        Self {
            text: html.into(),
            provenance: Provenance::UntrustedScraped,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }
}

/// Text that is safe to embed in the Extractor prompt.
///
/// Only constructed by the sanitizer (or by passing trusted input through
/// unchanged), so holding one proves the length and markup rules were applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedText(String);

impl SanitizedText {
    pub(crate) fn new_unchecked(text: String) -> Self {
        Self(text)
    }

    /// Prefixes the text with a fixed framing sentence for the Extractor.
    pub fn with_preamble(self, preamble: &str) -> Self {
        Self(format!("{preamble}{}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}
