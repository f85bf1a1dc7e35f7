//! Startup configuration.
//!
//! Values come from an optional JSON file, overridden by environment
//! variables (after loading `.env`). Only the Mistral key is required.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use mistral_client::{MistralClient, MistralError, DEFAULT_MODEL};
use sources::{secret, FetchResult, SourceFetcher};

use crate::completion::{CompletionSettings, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use crate::task::{Task, TaskEntry};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

pub const MISTRAL_API_KEY: &str = "MISTRAL_API_KEY";
pub const YOUTUBE_API_KEY: &str = "YOUTUBE_API_KEY";
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const CSE_ID: &str = "CSE_ID";

/// Completion channel tuning, all optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_attempts: u32,
    pub initial_delay_secs: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            max_attempts: policy.max_attempts,
            initial_delay_secs: policy.initial_delay.as_secs(),
            connect_timeout_secs: mistral_client::DEFAULT_CONNECT_TIMEOUT.as_secs(),
            request_timeout_secs: mistral_client::DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl CompletionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Completion("model cannot be empty".into()));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Completion("max_attempts must be at least 1".into()));
        }
        if self.connect_timeout_secs > self.request_timeout_secs {
            return Err(ConfigError::Completion(
                "connect timeout cannot exceed request timeout".into(),
            ));
        }
        Ok(())
    }

    pub fn settings(&self) -> CompletionSettings {
        CompletionSettings {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_initial_delay(Duration::from_secs(self.initial_delay_secs))
    }

    /// Build the Mistral client with the configured timeouts.
    pub fn build_client(&self, api_key: &SecretString) -> Result<MistralClient, MistralError> {
        MistralClient::with_timeouts(
            api_key.expose_secret(),
            Duration::from_secs(self.connect_timeout_secs),
            Duration::from_secs(self.request_timeout_secs),
        )
    }
}

/// Raw contents of the config file.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub mistral_api_key: Option<String>,
    pub youtube_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub cse_id: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskEntry>,
    #[serde(default)]
    pub completion: CompletionConfig,
}

impl ConfigFile {
    /// Read the file at `path`. A missing file is an empty config.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolved configuration.
#[derive(Debug)]
pub struct Config {
    pub mistral_api_key: SecretString,
    pub youtube_api_key: Option<SecretString>,
    pub google_api_key: Option<SecretString>,
    pub cse_id: Option<String>,
    /// Tasks from the config file; empty when none were given
    pub tasks: Vec<Task>,
    pub completion: CompletionConfig,
}

impl Config {
    /// Load `.env`, the config file at `path`, and the process environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let file = ConfigFile::read(path)?;
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with an environment lookup. The environment wins;
    /// blank values count as unset.
    pub fn from_sources<F>(file: ConfigFile, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, fallback: Option<String>| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .or(fallback.filter(|v| !v.trim().is_empty()))
                .map(|v| v.trim().to_string())
        };

        let mistral_api_key = pick(MISTRAL_API_KEY, file.mistral_api_key)
            .map(secret)
            .ok_or(ConfigError::MissingCredential(MISTRAL_API_KEY))?;
        let youtube_api_key = pick(YOUTUBE_API_KEY, file.youtube_api_key).map(secret);
        let google_api_key = pick(GOOGLE_API_KEY, file.google_api_key).map(secret);
        let cse_id = pick(CSE_ID, file.cse_id);

        file.completion.validate()?;

        let tasks = file
            .tasks
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                Task::try_from(entry).map_err(|source| ConfigError::Task {
                    index: index + 1,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            mistral_api_key,
            youtube_api_key,
            google_api_key,
            cse_id,
            tasks,
            completion: file.completion,
        })
    }

    pub fn has_youtube(&self) -> bool {
        self.youtube_api_key.is_some()
    }

    /// Google search needs both the API key and the search engine id.
    pub fn has_google(&self) -> bool {
        self.google_api_key.is_some() && self.cse_id.is_some()
    }

    /// Fetcher registry with every source the credentials allow.
    pub fn source_fetcher(&self) -> FetchResult<SourceFetcher> {
        let mut fetcher = SourceFetcher::new()?;
        if let Some(key) = &self.youtube_api_key {
            fetcher = fetcher.with_youtube(secret(key.expose_secret()));
        }
        if let (Some(key), Some(cse_id)) = (&self.google_api_key, &self.cse_id) {
            fetcher = fetcher.with_google(secret(key.expose_secret()), cse_id.clone());
        }
        Ok(fetcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sources::Source;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn parse(json: &str) -> ConfigFile {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_missing_mistral_key_is_fatal() {
        let err = Config::from_sources(ConfigFile::default(), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential("MISTRAL_API_KEY")));

        let err = Config::from_sources(
            parse(r#"{"mistral_api_key": ""}"#),
            env(&[("MISTRAL_API_KEY", "  ")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(_)));
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = parse(
            r#"{"mistral_api_key": "from-file", "youtube_api_key": "yt-file", "cse_id": "cx"}"#,
        );
        let config = Config::from_sources(file, env(&[("MISTRAL_API_KEY", "from-env")])).unwrap();

        assert_eq!(config.mistral_api_key.expose_secret(), "from-env");
        assert_eq!(
            config.youtube_api_key.as_ref().map(|k| k.expose_secret()),
            Some("yt-file")
        );
        assert!(config.has_youtube());
        assert!(!config.has_google());
    }

    #[test]
    fn test_tasks_and_completion_defaults() {
        let file = parse(
            r#"{
                "mistral_api_key": "key",
                "tasks": [
                    {"source": "web", "query": "https://example.com", "task": "summarize"},
                    {"query": "Plain text", "task": "classify", "prompt": "Topic only"}
                ]
            }"#,
        );
        let config = Config::from_sources(file, env(&[])).unwrap();

        assert_eq!(config.tasks.len(), 2);
        assert_eq!(config.tasks[0].source(), Source::Web);
        assert_eq!(config.tasks[0].prompt(), "Summarize the content");
        assert_eq!(config.tasks[1].source(), Source::Direct);
        assert_eq!(config.tasks[1].prompt(), "Topic only");

        assert_eq!(config.completion, CompletionConfig::default());
        assert_eq!(config.completion.model, "mistral-large-latest");
        assert_eq!(config.completion.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_invalid_task_reports_index() {
        let file = parse(
            r#"{
                "mistral_api_key": "key",
                "tasks": [
                    {"query": "fine", "task": "summarize"},
                    {"source": "youtube", "query": "https://vimeo.com/1", "task": "summarize"}
                ]
            }"#,
        );
        let err = Config::from_sources(file, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Task { index: 2, .. }));
    }

    #[test]
    fn test_completion_overrides() {
        let file = parse(
            r#"{
                "mistral_api_key": "key",
                "completion": {"model": "pixtral-large-2411", "max_attempts": 3, "initial_delay_secs": 5}
            }"#,
        );
        let config = Config::from_sources(file, env(&[])).unwrap();
        let policy = config.completion.retry_policy();

        assert_eq!(config.completion.settings().model, "pixtral-large-2411");
        assert_eq!(config.completion.max_tokens, 1000);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(5));

        let bad = parse(r#"{"mistral_api_key": "key", "completion": {"max_attempts": 0}}"#);
        assert!(matches!(
            Config::from_sources(bad, env(&[])),
            Err(ConfigError::Completion(_))
        ));
    }

    #[test]
    fn test_config_file_read() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ConfigFile::read(&dir.path().join("config.json")).unwrap();
        assert!(missing.mistral_api_key.is_none());

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            ConfigFile::read(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = Config::from_sources(
            parse(r#"{"mistral_api_key": "super-secret-key"}"#),
            env(&[]),
        )
        .unwrap();
        assert!(!format!("{config:?}").contains("super-secret-key"));
    }
}
