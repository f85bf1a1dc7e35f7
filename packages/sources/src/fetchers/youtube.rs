//! YouTube video metadata via the YouTube Data API v3.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::fetcher::Fetcher;

const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
}

/// Extract the video id from a watch URL (`v=` parameter) or short URL
/// (last path segment).
pub fn video_id(url: &str) -> Option<&str> {
    let id = match url.split_once("v=") {
        Some((_, rest)) => rest.split('&').next(),
        None => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.trim_end_matches('/').rsplit('/').next()),
    };
    id.map(str::trim).filter(|id| !id.is_empty())
}

/// Fetches the title and description of a YouTube video.
pub struct YouTubeFetcher {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl YouTubeFetcher {
    pub fn new(client: reqwest::Client, api_key: SecretString) -> Self {
        Self {
            client,
            api_key,
            base_url: YOUTUBE_API_URL.to_string(),
        }
    }

    /// Point at a different API root (tests, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Fetcher for YouTubeFetcher {
    async fn fetch(&self, query: &str) -> FetchResult<String> {
        let id = video_id(query).ok_or_else(|| FetchError::InvalidUrl {
            url: query.to_string(),
        })?;
        debug!(video_id = %id, "Fetching YouTube snippet");

        let url = format!("{}/videos", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("id", id),
                ("key", self.api_key.expose_secret()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body: VideoListResponse = response.json().await?;
        let snippet = body
            .items
            .into_iter()
            .next()
            .map(|item| item.snippet)
            .ok_or_else(|| FetchError::NotFound {
                query: query.to_string(),
            })?;

        Ok(format!(
            "Title: {}\nDescription: {}",
            snippet.title, snippet.description
        ))
    }

    fn name(&self) -> &str {
        "youtube"
    }
}
