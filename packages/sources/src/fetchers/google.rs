//! Google Custom Search JSON API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt::Write;
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::fetcher::Fetcher;

const CUSTOM_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Results requested per query.
pub const DEFAULT_NUM_RESULTS: u8 = 5;

/// Search response. `items` is absent when nothing matched.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Runs a Google Custom Search and flattens the hits into text.
pub struct GoogleSearchFetcher {
    client: reqwest::Client,
    api_key: SecretString,
    cse_id: String,
    num_results: u8,
    base_url: String,
}

impl GoogleSearchFetcher {
    pub fn new(client: reqwest::Client, api_key: SecretString, cse_id: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            cse_id: cse_id.into(),
            num_results: DEFAULT_NUM_RESULTS,
            base_url: CUSTOM_SEARCH_URL.to_string(),
        }
    }

    /// Number of hits to request (the API caps this at 10).
    pub fn with_num_results(mut self, num: u8) -> Self {
        self.num_results = num.clamp(1, 10);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Fetcher for GoogleSearchFetcher {
    async fn fetch(&self, query: &str) -> FetchResult<String> {
        let num = self.num_results.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.expose_secret()),
                ("cx", self.cse_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.base_url.clone(),
            });
        }

        let body: SearchResponse = response.json().await?;
        debug!(query = %query, results = body.items.len(), "Google search completed");

        let mut text = String::new();
        for item in &body.items {
            // Writing into a String cannot fail
            let _ = write!(
                text,
                "Title: {}\nLink: {}\nSnippet: {}\n\n",
                item.title, item.link, item.snippet
            );
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "google"
    }
}
