//! PDF text extraction for remote and local documents.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::fetcher::Fetcher;
use crate::source::is_http_url;

/// Extracts the text of a PDF given either an `http(s)` URL or a local path.
pub struct PdfFetcher {
    client: reqwest::Client,
}

impl PdfFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn download(&self, url: &str) -> FetchResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Paths pasted from a shell or list literal sometimes arrive wrapped in brackets.
pub(crate) fn clean_path(query: &str) -> &str {
    query.trim().trim_start_matches('[').trim_end_matches(']').trim()
}

/// Run the extractor on a blocking thread; it is CPU bound and may panic on
/// malformed input.
async fn extract_text(bytes: Vec<u8>) -> FetchResult<String> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| FetchError::Pdf(e.to_string()))?
        .map_err(|e| FetchError::Pdf(e.to_string()))
}

#[async_trait]
impl Fetcher for PdfFetcher {
    async fn fetch(&self, query: &str) -> FetchResult<String> {
        let target = query.trim();
        let bytes = if is_http_url(target) {
            self.download(target).await?
        } else {
            tokio::fs::read(clean_path(target)).await?
        };

        debug!(target = %target, bytes = bytes.len(), "Extracting PDF text");
        extract_text(bytes).await
    }

    fn name(&self) -> &str {
        "pdf"
    }
}
