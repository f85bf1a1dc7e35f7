//! Robots.txt parser and checker.

use reqwest::StatusCode;
use std::collections::HashMap;
use url::Url;

/// Parsed robots.txt rules.
#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    /// Rules per user-agent (lowercase)
    rules: HashMap<String, AgentRules>,

    /// Default rules (for *)
    default_rules: AgentRules,
}

/// Rules for a specific user-agent, in file order.
#[derive(Debug, Clone, Default)]
struct AgentRules {
    rules: Vec<Rule>,
}

/// One `Allow` or `Disallow` line.
#[derive(Debug, Clone)]
struct Rule {
    allow: bool,
    path: String,
}

impl AgentRules {
    /// The first rule whose path prefixes `path` decides; no match allows.
    fn verdict(&self, path: &str) -> bool {
        self.rules
            .iter()
            .find(|rule| path.starts_with(&rule.path))
            .map_or(true, |rule| rule.allow)
    }
}

impl RobotsTxt {
    /// Rules that allow nothing, used when the site refuses access to robots.txt.
    pub fn deny_all() -> Self {
        Self {
            default_rules: AgentRules {
                rules: vec![Rule {
                    allow: false,
                    path: "/".to_string(),
                }],
            },
            ..Default::default()
        }
    }

    /// Parse robots.txt content.
    ///
    /// Consecutive `User-agent` lines form one group sharing the rules that
    /// follow them. An empty `Disallow` or `Allow` value allows everything.
    pub fn parse(content: &str) -> Self {
        let mut robots = Self::default();
        let mut current_agents: Vec<String> = Vec::new();
        let mut current_rules = AgentRules::default();
        let mut in_rules = false;

        for line in content.lines() {
            // Strip trailing comments
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let Some((directive, value)) = line.split_once(':') else {
                continue;
            };
            let directive = directive.trim().to_lowercase();
            let value = value.trim();

            match directive.as_str() {
                "user-agent" => {
                    if in_rules {
                        robots.store_group(&current_agents, &current_rules);
                        current_agents.clear();
                        current_rules = AgentRules::default();
                        in_rules = false;
                    }
                    current_agents.push(value.to_lowercase());
                }
                "disallow" | "allow" => {
                    in_rules = true;
                    current_rules.rules.push(Rule {
                        allow: directive == "allow" || value.is_empty(),
                        path: value.to_string(),
                    });
                }
                _ => {}
            }
        }

        robots.store_group(&current_agents, &current_rules);
        robots
    }

    fn store_group(&mut self, agents: &[String], rules: &AgentRules) {
        for agent in agents {
            if agent == "*" {
                self.default_rules = rules.clone();
            } else {
                self.rules.insert(agent.clone(), rules.clone());
            }
        }
    }

    /// Check if a path is allowed for a user-agent.
    pub fn is_allowed(&self, user_agent: &str, path: &str) -> bool {
        let agent_lower = user_agent.to_lowercase();

        // Exact agent first, then any group whose token appears in the agent string
        let rules = self
            .rules
            .get(&agent_lower)
            .or_else(|| {
                self.rules
                    .iter()
                    .find(|(k, _)| agent_lower.contains(k.as_str()))
                    .map(|(_, v)| v)
            })
            .unwrap_or(&self.default_rules);

        rules.verdict(path)
    }

    /// Check a full URL (path plus query string).
    pub fn is_url_allowed(&self, user_agent: &str, url: &Url) -> bool {
        let target = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        self.is_allowed(user_agent, &target)
    }
}

/// Fetch and parse robots.txt for the site hosting `page_url`.
///
/// 401, 403 and server errors mean nothing may be fetched; any other
/// non-success status (typically 404) means everything may be.
pub async fn fetch_robots_txt(
    client: &reqwest::Client,
    page_url: &Url,
) -> Result<RobotsTxt, reqwest::Error> {
    let mut robots_url = page_url.clone();
    robots_url.set_path("/robots.txt");
    robots_url.set_query(None);
    robots_url.set_fragment(None);

    let response = client.get(robots_url).send().await?;
    match response.status() {
        status if status.is_success() => {
            let content = response.text().await?;
            Ok(RobotsTxt::parse(&content))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(RobotsTxt::deny_all()),
        status if status.is_server_error() => Ok(RobotsTxt::deny_all()),
        _ => Ok(RobotsTxt::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn test_parse_basic() {
        let content = r#"
User-agent: *
Disallow: /private/
Disallow: /admin/  # staff only
Allow: /public/
Crawl-delay: 2

Sitemap: https://example.com/sitemap.xml
        "#;

        let robots = RobotsTxt::parse(content);

        assert!(robots.is_allowed("Mozilla/5.0", "/public/page"));
        assert!(!robots.is_allowed("Mozilla/5.0", "/private/page"));
        assert!(!robots.is_allowed("Mozilla/5.0", "/admin/"));
        assert!(robots.is_allowed("Mozilla/5.0", "/other/page"));
    }

    #[test]
    fn test_agent_token_matches_full_user_agent() {
        let content = r#"
User-agent: *
Disallow:

User-agent: mozilla
Disallow: /articles/
        "#;

        let robots = RobotsTxt::parse(content);

        assert!(!robots.is_allowed("Mozilla/5.0", "/articles/1"));
        assert!(robots.is_allowed("OtherBot", "/articles/1"));
    }

    #[test]
    fn test_grouped_user_agents_share_rules() {
        let content = r#"
User-agent: alphabot
User-agent: mozilla
Disallow: /drafts/
        "#;

        let robots = RobotsTxt::parse(content);

        assert!(!robots.is_allowed("AlphaBot", "/drafts/x"));
        assert!(!robots.is_allowed("Mozilla/5.0", "/drafts/x"));
        assert!(robots.is_allowed("Mozilla/5.0", "/published/x"));
    }

    #[test]
    fn test_allow_listed_before_disallow_wins() {
        let content = r#"
User-agent: *
Allow: /private/public/
Disallow: /private/
        "#;

        let robots = RobotsTxt::parse(content);

        assert!(!robots.is_allowed("Bot", "/private/secret"));
        assert!(robots.is_allowed("Bot", "/private/public/page"));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let robots = RobotsTxt::parse("User-agent: *\nDisallow: /private/\nAllow: /\n");

        assert!(!robots.is_allowed("Mozilla/5.0", "/private/report"));
        assert!(robots.is_allowed("Mozilla/5.0", "/blog/post"));
    }

    #[test]
    fn test_empty_disallow_allows_everything() {
        let robots = RobotsTxt::parse("User-agent: *\nDisallow:\nDisallow: /tmp/\n");

        assert!(robots.is_allowed("Bot", "/tmp/file"));
    }

    #[test]
    fn test_empty_and_deny_all() {
        let robots = RobotsTxt::parse("");
        assert!(robots.is_allowed("AnyBot", "/any/path"));

        let denied = RobotsTxt::deny_all();
        assert!(!denied.is_allowed("AnyBot", "/"));
        assert!(!denied.is_allowed("AnyBot", "/page"));
    }

    #[test]
    fn test_url_check_includes_query() {
        let robots = RobotsTxt::parse("User-agent: *\nDisallow: /search?q=");
        let blocked = Url::parse("https://example.com/search?q=rust").unwrap();
        let open = Url::parse("https://example.com/search").unwrap();

        assert!(!robots.is_url_allowed("Mozilla/5.0", &blocked));
        assert!(robots.is_url_allowed("Mozilla/5.0", &open));
    }

    async fn robots_for_status(status: usize) -> RobotsTxt {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/robots.txt")
            .with_status(status)
            .create_async()
            .await;

        let page = Url::parse(&format!("{}/page?x=1", server.url())).unwrap();
        fetch_robots_txt(&reqwest::Client::new(), &page).await.unwrap()
    }

    #[tokio::test]
    async fn test_fetch_status_policy() {
        assert!(robots_for_status(404).await.is_allowed("Mozilla/5.0", "/page"));
        assert!(!robots_for_status(401).await.is_allowed("Mozilla/5.0", "/page"));
        assert!(!robots_for_status(403).await.is_allowed("Mozilla/5.0", "/page"));
        assert!(!robots_for_status(503).await.is_allowed("Mozilla/5.0", "/page"));
    }
}
