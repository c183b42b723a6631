//! Public-profile fetch for link-based submissions.
//!
//! A submission counts as a link when it carries `PROFILE_LINK_MARKER` and a
//! `https://www.linkedin.com/in/...` URL. Anything else is treated as pasted text.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

pub const PROFILE_LINK_MARKER: &str = "LinkedIn Profile Link:";

const PROFILE_ORIGIN: &str = "https://www.linkedin.com";

/// Framing sentence placed in front of scraped text before it reaches the Extractor.
pub const SCRAPED_PREAMBLE: &str = "Here is the raw scraped text from the user's LinkedIn profile: ";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static PROFILE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://www\.linkedin\.com/in/[^\s]+").expect("profile URL pattern is valid")
});

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

/// Returns the profile URL when `profile_text` is a link submission.
pub fn detect_profile_link(profile_text: &str) -> Option<&str> {
    if !profile_text.contains(PROFILE_LINK_MARKER) {
        return None;
    }
    PROFILE_URL.find(profile_text).map(|m| m.as_str())
}

/// Fetches raw page HTML for the sanitizer. One attempt, no retries.
#[derive(Clone)]
pub struct ProfileFetcher {
    http: Client,
    origin: String,
}

impl ProfileFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: Client::builder()
                .user_agent(BROWSER_USER_AGENT)
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            origin: PROFILE_ORIGIN.to_string(),
        }
    }

    /// Serves profile URLs from `origin` instead of the public site.
    #[cfg(test)]
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.trim_end_matches('/').to_string();
        self
    }

    fn target(&self, url: &str) -> String {
        match url.strip_prefix(PROFILE_ORIGIN) {
            Some(path) => format!("{}{path}", self.origin),
            None => url.to_string(),
        }
    }

    pub async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let target = self.target(url);
        let url = target.as_str();
        info!("Fetching public profile page {url}");
        let request_failed = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.http.get(url).send().await.map_err(request_failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(request_failed)?;
        debug!("Fetched {} bytes from {url}", html.len());
        Ok(html)
    }
}
