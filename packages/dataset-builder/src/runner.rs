//! Concurrent task execution.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::info;

use sources::{FetchResult, FetchedContent, Source, SourceFetcher};

use crate::completion::ResilientCompletionClient;
use crate::notify::{NoticeLevel, Notifier};
use crate::task::{DatasetRecord, Task};

// =============================================================================
// Source Fetcher Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseSourceFetcher: Send + Sync {
    /// Fetch text for `query` from `source`.
    async fn fetch(&self, source: Source, query: &str) -> FetchResult<FetchedContent>;
}

#[async_trait]
impl BaseSourceFetcher for SourceFetcher {
    async fn fetch(&self, source: Source, query: &str) -> FetchResult<FetchedContent> {
        SourceFetcher::fetch(self, source, query).await
    }
}

/// How a single task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed(DatasetRecord),
    /// Nothing to process; the completion endpoint was never called
    FetchFailed,
    /// Every completion attempt failed
    CompletionFailed,
}

impl TaskOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed(_))
    }

    pub fn into_record(self) -> Option<DatasetRecord> {
        match self {
            TaskOutcome::Completed(record) => Some(record),
            _ => None,
        }
    }
}

/// Keep successful records, in submission order.
pub fn into_records(outcomes: Vec<TaskOutcome>) -> Vec<DatasetRecord> {
    outcomes
        .into_iter()
        .filter_map(TaskOutcome::into_record)
        .collect()
}

/// Runs tasks through fetch and completion.
pub struct TaskRunner {
    fetcher: Arc<dyn BaseSourceFetcher>,
    completion: Arc<ResilientCompletionClient>,
    notifier: Arc<dyn Notifier>,
}

impl TaskRunner {
    pub fn new(
        fetcher: Arc<dyn BaseSourceFetcher>,
        completion: Arc<ResilientCompletionClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            fetcher,
            completion,
            notifier,
        }
    }

    /// Text for a task. Direct tasks use the query itself; fetch errors are
    /// reported and yield empty text.
    async fn content_for(&self, task: &Task) -> String {
        let source = task.source();
        if !source.requires_fetch() {
            return task.query().to_string();
        }

        self.notifier.notify(
            NoticeLevel::Loading,
            &format!("Fetching {source} content for: {}", task.query()),
        );
        match self.fetcher.fetch(source, task.query()).await {
            Ok(fetched) => fetched.content,
            Err(e) => {
                self.notifier.notify(
                    NoticeLevel::Error,
                    &format!("Error fetching {source} content: {e}"),
                );
                String::new()
            }
        }
    }

    pub async fn process_task(&self, task: &Task) -> TaskOutcome {
        let content = self.content_for(task).await;
        if content.trim().is_empty() {
            self.notifier.notify(
                NoticeLevel::Warning,
                &format!("No content for {} query: {}", task.source(), task.query()),
            );
            return TaskOutcome::FetchFailed;
        }

        match self
            .completion
            .complete(task.task_kind(), &content, task.prompt())
            .await
        {
            Some(response) => {
                TaskOutcome::Completed(DatasetRecord::new(task, content, response.result_text))
            }
            None => TaskOutcome::CompletionFailed,
        }
    }

    /// Run every task concurrently. Outcomes come back in submission order.
    pub async fn run_all(&self, tasks: &[Task]) -> Vec<TaskOutcome> {
        self.notifier.notify(
            NoticeLevel::Info,
            &format!("Processing {} task(s) concurrently", tasks.len()),
        );

        let outcomes = join_all(tasks.iter().map(|task| self.process_task(task))).await;

        let completed = outcomes.iter().filter(|o| o.is_completed()).count();
        info!(total = tasks.len(), completed, "Tasks finished");
        self.notifier.notify(
            NoticeLevel::Info,
            &format!("{completed} of {} task(s) completed", tasks.len()),
        );
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryNotifier, Reply, ScriptedCompletion, StaticFetcher};
    use tokio::time::Instant;

    struct Fixture {
        fetcher: Arc<StaticFetcher>,
        backend: Arc<ScriptedCompletion>,
        notifier: Arc<MemoryNotifier>,
        runner: TaskRunner,
    }

    fn fixture(fetcher: StaticFetcher, backend: ScriptedCompletion) -> Fixture {
        let fetcher = Arc::new(fetcher);
        let backend = Arc::new(backend);
        let notifier = Arc::new(MemoryNotifier::new());
        let completion = Arc::new(ResilientCompletionClient::new(
            backend.clone(),
            notifier.clone(),
        ));
        let runner = TaskRunner::new(fetcher.clone(), completion, notifier.clone());
        Fixture {
            fetcher,
            backend,
            notifier,
            runner,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_direct_task_skips_fetch() {
        let f = fixture(StaticFetcher::new(), ScriptedCompletion::always("summary"));
        let task = Task::direct("Rust has no garbage collector.", "summarize", "").unwrap();

        let outcome = f.runner.process_task(&task).await;

        let record = outcome.into_record().unwrap();
        assert_eq!(record.content, "Rust has no garbage collector.");
        assert_eq!(record.result, "summary");
        assert_eq!(record.prompt, "Summarize the content");
        assert!(f.fetcher.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_never_reaches_completion() {
        let f = fixture(
            StaticFetcher::new().with_content("https://example.com/empty", "   "),
            ScriptedCompletion::always("should not be used"),
        );
        let missing = Task::new(Source::Web, "https://example.com/missing", "analyze", "").unwrap();
        let empty = Task::new(Source::Web, "https://example.com/empty", "analyze", "").unwrap();

        assert_eq!(f.runner.process_task(&missing).await, TaskOutcome::FetchFailed);
        assert_eq!(f.runner.process_task(&empty).await, TaskOutcome::FetchFailed);
        assert_eq!(f.backend.call_count(), 0);
        assert!(f
            .notifier
            .messages(NoticeLevel::Error)
            .iter()
            .any(|m| m.starts_with("Error fetching web content")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_failure() {
        let f = fixture(StaticFetcher::new(), ScriptedCompletion::new([Reply::Status(500)]));
        let task = Task::direct("text", "classify", "").unwrap();

        assert_eq!(f.runner.process_task(&task).await, TaskOutcome::CompletionFailed);
        assert_eq!(f.backend.call_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_all_keeps_submission_order_and_runs_concurrently() {
        let f = fixture(
            StaticFetcher::new()
                .with_content("https://example.com/a", "page a")
                .with_content("https://example.com/b", "page b"),
            ScriptedCompletion::new([
                Reply::RateLimited,
                Reply::text("result"),
            ]),
        );
        let tasks = vec![
            Task::new(Source::Web, "https://example.com/a", "summarize", "").unwrap(),
            Task::new(Source::Web, "https://example.com/missing", "summarize", "").unwrap(),
            Task::direct("inline text", "analyze", "").unwrap(),
            Task::new(Source::Web, "https://example.com/b", "extract", "").unwrap(),
        ];

        let start = Instant::now();
        let outcomes = f.runner.run_all(&tasks).await;

        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[1], TaskOutcome::FetchFailed);

        let records = into_records(outcomes);
        let queries: Vec<&str> = records.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(
            queries,
            vec!["https://example.com/a", "inline text", "https://example.com/b"]
        );
        // Only one backoff of 3s, shared across concurrently waiting tasks
        assert_eq!(start.elapsed().as_secs(), 3);
    }
}
