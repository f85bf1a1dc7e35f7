//! Visible text of a web page, fetched only when robots.txt allows it.

use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use super::USER_AGENT;
use crate::error::{FetchError, FetchResult};
use crate::fetcher::Fetcher;
use crate::robots::fetch_robots_txt;

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Convert an HTML document into newline-separated visible text.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut lines = Vec::new();
    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let fragment = text.trim();
        if !fragment.is_empty() {
            lines.push(fragment);
        }
    }

    lines.join("\n")
}

/// Fetches a page and returns its visible text.
pub struct WebFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl WebFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Check robots.txt for the page. Unreachable robots.txt counts as a refusal.
    async fn check_robots(&self, url: &Url) -> FetchResult<()> {
        let allowed = match fetch_robots_txt(&self.client, url).await {
            Ok(robots) => robots.is_url_allowed(&self.user_agent, url),
            Err(e) => {
                warn!(url = %url, error = %e, "Could not read robots.txt");
                false
            }
        };

        if allowed {
            Ok(())
        } else {
            Err(FetchError::RobotsDisallowed {
                url: url.to_string(),
            })
        }
    }
}

#[async_trait]
impl Fetcher for WebFetcher {
    async fn fetch(&self, query: &str) -> FetchResult<String> {
        let url = Url::parse(query.trim()).map_err(|_| FetchError::InvalidUrl {
            url: query.to_string(),
        })?;

        self.check_robots(&url).await?;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await?;
        let text = html_to_text(&html);
        debug!(url = %url, chars = text.len(), "Fetched web page");
        Ok(text)
    }

    fn name(&self) -> &str {
        "web"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn test_html_to_text_skips_hidden_elements() {
        let html = r#"
            <html>
              <head><title>Notes</title><style>body { color: red; }</style></head>
              <body>
                <h1> Heading </h1>
                <script>var tracking = 1;</script>
                <p>First paragraph.</p>
                <noscript>Enable JavaScript</noscript>
                <div><span>Nested</span> text</div>
              </body>
            </html>
        "#;

        assert_eq!(
            html_to_text(html),
            "Notes\nHeading\nFirst paragraph.\nNested\ntext"
        );
    }

    #[test]
    fn test_html_to_text_empty_document() {
        assert_eq!(html_to_text(""), "");
        assert_eq!(html_to_text("<html><body>   </body></html>"), "");
    }

    #[tokio::test]
    async fn test_fetch_returns_visible_text() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/robots.txt")
            .with_status(404)
            .create_async()
            .await;
        let page = server
            .mock("GET", "/article")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><p>Hello</p><p>World</p></body></html>")
            .create_async()
            .await;

        let fetcher = WebFetcher::new(reqwest::Client::new());
        let text = fetcher
            .fetch(&format!("{}/article", server.url()))
            .await
            .unwrap();

        assert_eq!(text, "Hello\nWorld");
        page.assert_async().await;
    }

    #[tokio::test]
    async fn test_robots_disallow_skips_page() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/robots.txt")
            .with_status(200)
            .with_body("User-agent: *\nDisallow: /private/")
            .create_async()
            .await;
        let page = server
            .mock("GET", "/private/report")
            .expect(0)
            .create_async()
            .await;

        let fetcher = WebFetcher::new(reqwest::Client::new());
        let err = fetcher
            .fetch(&format!("{}/private/report", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::RobotsDisallowed { .. }));
        page.assert_async().await;
    }

    #[tokio::test]
    async fn test_forbidden_robots_denies_everything() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/robots.txt")
            .with_status(403)
            .create_async()
            .await;

        let fetcher = WebFetcher::new(reqwest::Client::new());
        let err = fetcher
            .fetch(&format!("{}/", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::RobotsDisallowed { .. }));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/robots.txt")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", "/gone")
            .with_status(410)
            .create_async()
            .await;

        let fetcher = WebFetcher::new(reqwest::Client::new());
        let err = fetcher
            .fetch(&format!("{}/gone", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 410, .. }));
    }
}
