//! Typed errors for source fetching.

use thiserror::Error;

use crate::source::Source;

/// Errors that can occur while fetching text from a source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Robots.txt disallows fetching
    #[error("robots.txt disallows: {url}")]
    RobotsDisallowed { url: String },

    /// Source needs an API key that was not configured
    #[error("missing credential for {service}")]
    MissingCredential { service: &'static str },

    /// Upstream API returned no matching item
    #[error("nothing found for: {query}")]
    NotFound { query: String },

    /// PDF could not be parsed
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Local file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No fetcher exists for this source kind
    #[error("unsupported source: {0}")]
    UnsupportedSource(Source),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Reasons a query is rejected for a source before any fetch happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("invalid YouTube URL: must contain 'youtube.com/watch?v=' or 'youtu.be/'")]
    NotYouTubeUrl,

    #[error("invalid URL: must start with http:// or https://")]
    NotHttpUrl,

    #[error("PDF URL must end with .pdf")]
    NotPdfUrl,
}
