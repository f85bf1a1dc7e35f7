//! Tasks and the records they produce.

use serde::{Deserialize, Serialize};
use std::fmt;

use sources::Source;

use crate::error::TaskError;

/// Task kinds offered interactively, each with a default prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Summarize,
    Analyze,
    Extract,
    Classify,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::Summarize,
        TaskKind::Analyze,
        TaskKind::Extract,
        TaskKind::Classify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Summarize => "summarize",
            TaskKind::Analyze => "analyze",
            TaskKind::Extract => "extract",
            TaskKind::Classify => "classify",
        }
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Summarize => "Summarize",
            TaskKind::Analyze => "Analyze",
            TaskKind::Extract => "Extract key points",
            TaskKind::Classify => "Classify",
        }
    }

    pub fn default_prompt(&self) -> &'static str {
        match self {
            TaskKind::Summarize => "Summarize the content",
            TaskKind::Analyze => "Analyze the main points and sentiment",
            TaskKind::Extract => "Extract key information and findings",
            TaskKind::Classify => "Classify the topic and sentiment",
        }
    }

    /// Look up a known kind by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work: fetch (unless direct), complete, record.
///
/// Validated at construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    source: Source,
    query: String,
    task_kind: String,
    prompt: String,
}

impl Task {
    /// Validate `query` for `source` and fill in the default prompt for known
    /// task kinds when `prompt` is empty.
    pub fn new(
        source: Source,
        query: impl Into<String>,
        task_kind: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Result<Self, TaskError> {
        let query = query.into().trim().to_string();
        source.validate_query(&query)?;

        let task_kind = task_kind.into().trim().to_string();
        if task_kind.is_empty() {
            return Err(TaskError::EmptyKind);
        }

        let mut prompt = prompt.into().trim().to_string();
        if prompt.is_empty() {
            if let Some(kind) = TaskKind::from_name(&task_kind) {
                prompt = kind.default_prompt().to_string();
            }
        }

        Ok(Self {
            source,
            query,
            task_kind,
            prompt,
        })
    }

    /// Task over literal text.
    pub fn direct(
        text: impl Into<String>,
        task_kind: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Result<Self, TaskError> {
        Self::new(Source::Direct, text, task_kind, prompt)
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn task_kind(&self) -> &str {
        &self.task_kind
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Task as written in the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskEntry {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub query: String,
    #[serde(rename = "task")]
    pub task_kind: String,
    #[serde(default)]
    pub prompt: String,
}

impl TryFrom<TaskEntry> for Task {
    type Error = TaskError;

    fn try_from(entry: TaskEntry) -> Result<Self, Self::Error> {
        Task::new(entry.source, entry.query, entry.task_kind, entry.prompt)
    }
}

/// Name stamped on every record.
pub const PROCESSED_BY: &str = "mistral";

/// One successful task, as persisted in the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub source: Source,
    pub query: String,
    #[serde(rename = "task")]
    pub task_kind: String,
    pub prompt: String,
    pub content: String,
    pub result: String,
    pub processed_by: String,
}

impl DatasetRecord {
    pub fn new(task: &Task, content: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            source: task.source,
            query: task.query.clone(),
            task_kind: task.task_kind.clone(),
            prompt: task.prompt.clone(),
            content: content.into(),
            result: result.into(),
            processed_by: PROCESSED_BY.to_string(),
        }
    }
}
