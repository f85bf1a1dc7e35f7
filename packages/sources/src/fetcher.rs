//! Fetcher trait and the registry that dispatches by [`Source`].

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::fetchers::{http_client, GoogleSearchFetcher, PdfFetcher, WebFetcher, YouTubeFetcher};
use crate::source::Source;

/// Obtains raw text for a query from one kind of source.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the text behind `query`.
    async fn fetch(&self, query: &str) -> FetchResult<String>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Text fetched for a task. Empty `content` means there is nothing to process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedContent {
    pub source: Source,
    pub query: String,
    pub content: String,
}

impl FetchedContent {
    pub fn new(source: Source, query: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source,
            query: query.into(),
            content: content.into(),
        }
    }
}

/// One fetcher per source kind. YouTube and Google are only available when
/// their credentials were supplied.
pub struct SourceFetcher {
    youtube: Option<YouTubeFetcher>,
    google: Option<GoogleSearchFetcher>,
    web: WebFetcher,
    pdf: PdfFetcher,
    client: reqwest::Client,
}

impl SourceFetcher {
    pub fn new() -> FetchResult<Self> {
        Ok(Self::with_client(http_client()?))
    }

    /// Build the registry around an existing HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            youtube: None,
            google: None,
            web: WebFetcher::new(client.clone()),
            pdf: PdfFetcher::new(client.clone()),
            client,
        }
    }

    pub fn with_youtube(mut self, api_key: SecretString) -> Self {
        self.youtube = Some(YouTubeFetcher::new(self.client.clone(), api_key));
        self
    }

    pub fn with_google(mut self, api_key: SecretString, cse_id: impl Into<String>) -> Self {
        self.google = Some(GoogleSearchFetcher::new(
            self.client.clone(),
            api_key,
            cse_id,
        ));
        self
    }

    /// The fetcher responsible for `source`.
    pub fn fetcher_for(&self, source: Source) -> FetchResult<&dyn Fetcher> {
        match source {
            Source::YouTube => self
                .youtube
                .as_ref()
                .map(|f| f as &dyn Fetcher)
                .ok_or(FetchError::MissingCredential { service: "YouTube" }),
            Source::Google => self
                .google
                .as_ref()
                .map(|f| f as &dyn Fetcher)
                .ok_or(FetchError::MissingCredential { service: "Google" }),
            Source::Web => Ok(&self.web),
            Source::Pdf => Ok(&self.pdf),
            Source::Direct => Err(FetchError::UnsupportedSource(source)),
        }
    }

    /// Fetch the text for `query` from `source`.
    pub async fn fetch(&self, source: Source, query: &str) -> FetchResult<FetchedContent> {
        let fetcher = self.fetcher_for(source)?;
        debug!(fetcher = fetcher.name(), query = %query, "Fetching source");

        let content = fetcher.fetch(query).await?;
        Ok(FetchedContent::new(source, query, content))
    }
}

impl fmt::Debug for SourceFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFetcher")
            .field("youtube", &self.youtube.is_some())
            .field("google", &self.google.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret;

    #[test]
    fn test_missing_credentials() {
        let fetcher = SourceFetcher::with_client(reqwest::Client::new());

        assert!(matches!(
            fetcher.fetcher_for(Source::YouTube),
            Err(FetchError::MissingCredential { service: "YouTube" })
        ));
        assert!(matches!(
            fetcher.fetcher_for(Source::Google),
            Err(FetchError::MissingCredential { service: "Google" })
        ));
    }

    #[test]
    fn test_dispatch() {
        let fetcher = SourceFetcher::with_client(reqwest::Client::new())
            .with_youtube(secret("yt"))
            .with_google(secret("g"), "cx");

        assert_eq!(fetcher.fetcher_for(Source::YouTube).unwrap().name(), "youtube");
        assert_eq!(fetcher.fetcher_for(Source::Google).unwrap().name(), "google");
        assert_eq!(fetcher.fetcher_for(Source::Web).unwrap().name(), "web");
        assert_eq!(fetcher.fetcher_for(Source::Pdf).unwrap().name(), "pdf");
        assert!(matches!(
            fetcher.fetcher_for(Source::Direct),
            Err(FetchError::UnsupportedSource(Source::Direct))
        ));
    }

    #[test]
    fn test_debug_hides_keys() {
        let fetcher =
            SourceFetcher::with_client(reqwest::Client::new()).with_youtube(secret("yt-secret"));
        let debug = format!("{fetcher:?}");

        assert!(debug.contains("youtube: true"));
        assert!(!debug.contains("yt-secret"));
    }
}
