//! Text sources for dataset building.
//!
//! Each [`Source`] kind has a [`Fetcher`] that turns a query into plain text:
//! a YouTube URL into the video's title and description, a search query into
//! result snippets, a web page URL into its visible text, and a PDF URL or
//! path into its extracted text. Direct text needs no fetching.
//!
//! # Example
//!
//! ```rust,ignore
//! use sources::{Source, SourceFetcher};
//!
//! let fetcher = SourceFetcher::new()?.with_youtube(sources::secret(key));
//! let fetched = fetcher.fetch(Source::Web, "https://example.com").await?;
//! ```

pub mod error;
pub mod fetcher;
pub mod fetchers;
pub mod robots;
pub mod source;

pub use error::{FetchError, FetchResult, QueryError};
pub use fetcher::{FetchedContent, Fetcher, SourceFetcher};
pub use fetchers::{
    html_to_text, video_id, GoogleSearchFetcher, PdfFetcher, WebFetcher, YouTubeFetcher,
};
pub use robots::RobotsTxt;
pub use source::{ParseSourceError, Source};

use secrecy::{SecretBox, SecretString};

/// Wrap a credential so it never shows up in logs or `Debug` output.
pub fn secret(value: impl Into<String>) -> SecretString {
    SecretBox::new(value.into().into_boxed_str())
}
