//! Fetcher implementations, one per source kind.
//!
//! - `YouTubeFetcher` - video title and description via the YouTube Data API
//! - `GoogleSearchFetcher` - result snippets via the Custom Search JSON API
//! - `WebFetcher` - visible page text, gated by robots.txt
//! - `PdfFetcher` - text of a remote or local PDF

mod google;
mod pdf;
mod web;
mod youtube;

pub use google::GoogleSearchFetcher;
pub use pdf::PdfFetcher;
pub use web::{html_to_text, WebFetcher};
pub use youtube::{video_id, YouTubeFetcher};

use std::time::Duration;

use crate::error::FetchResult;

/// User agent sent with every request and used for robots.txt matching.
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Per-request timeout for source fetches.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by the fetchers.
pub fn http_client() -> FetchResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?)
}
