//! Test doubles for the pipeline seams.
//!
//! These let callers exercise retry, fetching and dataset assembly without
//! network access:
//! - [`MemoryNotifier`] records every notification
//! - [`ScriptedCompletion`] replays a fixed sequence of completion replies
//! - [`StaticFetcher`] returns canned content per query

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

use mistral_client::{ChatRequest, ChatResponse, MistralError};
use sources::{FetchError, FetchResult, FetchedContent, Source};

use crate::completion::BaseCompletion;
use crate::notify::{NoticeLevel, Notifier};
use crate::runner::BaseSourceFetcher;

/// Notifier that keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices in emission order.
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    /// Messages emitted at `level`.
    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push((level, message.to_string()));
        }
    }
}

/// One scripted reply from the completion backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    RateLimited,
    Status(u16),
    Timeout,
    Malformed,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Reply::Text(content.into())
    }

    fn into_result(self) -> Result<ChatResponse, MistralError> {
        match self {
            Reply::Text(content) => Ok(ChatResponse {
                content,
                usage: None,
            }),
            Reply::RateLimited => Err(MistralError::RateLimited),
            Reply::Status(status) => Err(MistralError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
            Reply::Timeout => Err(MistralError::Network {
                message: "operation timed out".to_string(),
                timeout: true,
            }),
            Reply::Malformed => Err(MistralError::Parse("missing choices".to_string())),
        }
    }
}

/// Completion backend that replays scripted replies and records each call.
///
/// When the script runs out, the last reply repeats.
#[derive(Debug)]
pub struct ScriptedCompletion {
    script: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    calls: Mutex<Vec<(Instant, ChatRequest)>>,
}

impl ScriptedCompletion {
    pub fn new(script: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            last: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Backend that always answers with `content`.
    pub fn always(content: impl Into<String>) -> Self {
        Self::new([Reply::text(content)])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Requests received, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.calls
            .lock()
            .map(|c| c.iter().map(|(_, r)| r.clone()).collect())
            .unwrap_or_default()
    }

    /// Whole seconds between the first call and each call.
    pub fn call_offsets_secs(&self) -> Vec<u64> {
        let calls = match self.calls.lock() {
            Ok(calls) => calls,
            Err(_) => return Vec::new(),
        };
        let Some((first, _)) = calls.first() else {
            return Vec::new();
        };
        calls
            .iter()
            .map(|(at, _)| at.duration_since(*first).as_secs())
            .collect()
    }

    fn next_reply(&self) -> Reply {
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        let mut last = match self.last.lock() {
            Ok(last) => last,
            Err(_) => return Reply::Malformed,
        };
        if let Some(reply) = next {
            *last = Some(reply);
        }
        last.clone().unwrap_or(Reply::Malformed)
    }
}

#[async_trait]
impl BaseCompletion for ScriptedCompletion {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, MistralError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((Instant::now(), request.clone()));
        }
        self.next_reply().into_result()
    }
}

/// Fetcher returning canned content keyed by query. Unknown queries fail
/// with [`FetchError::NotFound`].
#[derive(Debug, Default)]
pub struct StaticFetcher {
    content: HashMap<String, String>,
    calls: Mutex<Vec<(Source, String)>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, query: impl Into<String>, content: impl Into<String>) -> Self {
        self.content.insert(query.into(), content.into());
        self
    }

    pub fn calls(&self) -> Vec<(Source, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl BaseSourceFetcher for StaticFetcher {
    async fn fetch(&self, source: Source, query: &str) -> FetchResult<FetchedContent> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((source, query.to_string()));
        }
        match self.content.get(query) {
            Some(content) => Ok(FetchedContent::new(source, query, content.clone())),
            None => Err(FetchError::NotFound {
                query: query.to_string(),
            }),
        }
    }
}
