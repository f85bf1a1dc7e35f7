//! Source kinds a task can draw its text from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;

/// Origin of the text a task operates on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// YouTube video metadata (title and description)
    YouTube,
    /// Google Custom Search results
    Google,
    /// Visible text of a web page
    Web,
    /// Text of a PDF document (URL or local path)
    Pdf,
    /// The query itself is the text
    #[default]
    Direct,
}

impl Source {
    /// All sources, in the order they are offered interactively.
    pub const ALL: [Source; 5] = [
        Source::YouTube,
        Source::Google,
        Source::Web,
        Source::Pdf,
        Source::Direct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::YouTube => "youtube",
            Source::Google => "google",
            Source::Web => "web",
            Source::Pdf => "pdf",
            Source::Direct => "direct",
        }
    }

    /// Menu label for interactive selection.
    pub fn label(&self) -> &'static str {
        match self {
            Source::YouTube => "YouTube (requires YouTube API key)",
            Source::Google => "Google Search (requires Google API key)",
            Source::Web => "Web Page",
            Source::Pdf => "PDF File",
            Source::Direct => "Direct Text",
        }
    }

    /// Hint shown when asking for a query.
    pub fn query_hint(&self) -> &'static str {
        match self {
            Source::YouTube => {
                "Enter YouTube video URL (must contain 'youtube.com/watch?v=' or 'youtu.be/')"
            }
            Source::Google => "Enter search query",
            Source::Web => "Enter web page URL (must start with http:// or https://)",
            Source::Pdf => "Enter PDF file path or URL (if URL, must end with .pdf)",
            Source::Direct => "Enter text to process",
        }
    }

    /// Whether text has to be fetched, as opposed to taken from the query.
    pub fn requires_fetch(&self) -> bool {
        !matches!(self, Source::Direct)
    }

    /// Check that `query` is usable for this source.
    pub fn validate_query(&self, query: &str) -> Result<(), QueryError> {
        let query = query.trim();
        match self {
            Source::YouTube => {
                if query.contains("youtube.com/watch?v=") || query.contains("youtu.be/") {
                    Ok(())
                } else {
                    Err(QueryError::NotYouTubeUrl)
                }
            }
            Source::Google if query.is_empty() => Err(QueryError::Empty("Search query")),
            Source::Web => {
                if is_http_url(query) {
                    Ok(())
                } else {
                    Err(QueryError::NotHttpUrl)
                }
            }
            Source::Pdf if query.is_empty() => Err(QueryError::Empty("PDF path")),
            Source::Pdf if is_http_url(query) && !query.ends_with(".pdf") => {
                Err(QueryError::NotPdfUrl)
            }
            Source::Direct if query.is_empty() => Err(QueryError::Empty("Text")),
            _ => Ok(()),
        }
    }
}

pub(crate) fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown source name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown source: {0}")]
pub struct ParseSourceError(pub String);

impl FromStr for Source {
    type Err = ParseSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "youtube" => Ok(Source::YouTube),
            "google" => Ok(Source::Google),
            "web" => Ok(Source::Web),
            "pdf" => Ok(Source::Pdf),
            "direct" => Ok(Source::Direct),
            other => Err(ParseSourceError(other.to_string())),
        }
    }
}
