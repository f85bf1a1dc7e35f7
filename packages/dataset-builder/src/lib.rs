//! Multi-source dataset builder.
//!
//! Fetches text from YouTube, Google search, web pages, PDFs or direct input,
//! sends each text to Mistral for a task (summarize, analyze, extract,
//! classify) and saves the successful results as a JSON or CSV dataset.
//!
//! # Architecture
//!
//! ```text
//! Task ──► TaskRunner ──► BaseSourceFetcher (skipped for direct text)
//!              │
//!              └──► ResilientCompletionClient ──► RetryPolicy ──► BaseCompletion
//!                                                                    (MistralClient)
//! outcomes ──► DatasetWriter ──► datasets/<name>.<json|csv>
//! ```
//!
//! Status messages go through an injected [`Notifier`].
//!
//! # Example
//!
//! ```rust,ignore
//! use dataset_builder::{
//!     into_records, ConsoleNotifier, DatasetFormat, DatasetWriter,
//!     ResilientCompletionClient, Task, TaskRunner,
//! };
//!
//! let notifier = Arc::new(ConsoleNotifier);
//! let completion = ResilientCompletionClient::new(Arc::new(mistral), notifier.clone());
//! let runner = TaskRunner::new(Arc::new(fetcher), Arc::new(completion), notifier);
//!
//! let tasks = vec![Task::direct("Rust is a systems language.", "summarize", "")?];
//! let records = into_records(runner.run_all(&tasks).await);
//! let path = DatasetWriter::default().write(&records, "demo", DatasetFormat::Json)?;
//! ```

pub mod completion;
pub mod config;
pub mod dataset;
pub mod error;
pub mod interactive;
pub mod notify;
pub mod retry;
pub mod runner;
pub mod task;
pub mod testing;

pub use completion::{
    sanitize_text, BaseCompletion, CompletionResponse, CompletionSettings,
    ResilientCompletionClient, MAX_TEXT_CHARS,
};
pub use config::{CompletionConfig, Config, ConfigFile, DEFAULT_CONFIG_PATH};
pub use dataset::{
    read_json, DatasetFormat, DatasetWriter, DEFAULT_DATASET_NAME, DEFAULT_OUTPUT_DIR,
};
pub use error::{ConfigError, DatasetError, TaskError};
pub use notify::{ConsoleNotifier, NoticeLevel, Notifier, TracingNotifier};
pub use retry::{RetryOn, RetryOutcome, RetryPolicy, Retryable};
pub use runner::{into_records, BaseSourceFetcher, TaskOutcome, TaskRunner};
pub use task::{DatasetRecord, Task, TaskEntry, TaskKind, PROCESSED_BY};
