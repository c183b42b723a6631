// Intake: everything between the caller's raw submission and the text the
// Extractor stage sees. PDF extraction, link detection + fetch, sanitization.

pub mod handlers;
pub mod pdf;
pub mod sanitizer;
pub mod scrape;

use thiserror::Error;
use tracing::{info, warn};

use crate::intake::sanitizer::{prepare, SanitizeError};
use crate::intake::scrape::{detect_profile_link, FetchError, ProfileFetcher, SCRAPED_PREAMBLE};
use crate::models::profile::{ProfileInput, SanitizedText};

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Source blocked extraction: {0}")]
    SourceUnavailable(#[from] FetchError),

    #[error(transparent)]
    InsufficientContent(#[from] SanitizeError),
}

/// Resolves a submission into the exact text the Extractor will receive.
///
/// Link submissions are fetched, sanitized, and framed with `SCRAPED_PREAMBLE`.
/// Pasted or uploaded text is trusted and passed through as-is.
pub async fn resolve_profile(
    fetcher: &ProfileFetcher,
    profile_text: &str,
) -> Result<SanitizedText, IntakeError> {
    let Some(url) = detect_profile_link(profile_text) else {
        return Ok(prepare(&ProfileInput::trusted(profile_text))?);
    };

    let html = fetcher.fetch_html(url).await.map_err(|e| {
        warn!("Profile fetch failed: {e}");
        e
    })?;

    let sanitized = prepare(&ProfileInput::scraped(html)).map_err(|e| {
        warn!("Scraped profile rejected: {e}");
        e
    })?;
    info!("Scraped profile sanitized to {} characters", sanitized.char_len());

    Ok(sanitized.with_preamble(SCRAPED_PREAMBLE))
}
