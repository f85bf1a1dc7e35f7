//! Interactive task entry.

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, Select};

use sources::Source;

use crate::config::Config;
use crate::notify::{NoticeLevel, Notifier};
use crate::task::{Task, TaskKind};

const DONE_LABEL: &str = "Done (start processing)";

/// Menu entries: every source, then "done".
pub fn source_menu() -> Vec<&'static str> {
    Source::ALL
        .iter()
        .map(Source::label)
        .chain(std::iter::once(DONE_LABEL))
        .collect()
}

pub fn task_menu() -> Vec<&'static str> {
    TaskKind::ALL.iter().map(TaskKind::label).collect()
}

/// Why a source cannot be used with the loaded credentials, if it cannot.
pub fn unavailable_reason(source: Source, config: &Config) -> Option<&'static str> {
    match source {
        Source::YouTube if !config.has_youtube() => Some("YouTube API key not configured"),
        Source::Google if !config.has_google() => {
            Some("Google API key or search engine ID not configured")
        }
        _ => None,
    }
}

/// Prompt for tasks until the user picks "done".
pub fn collect_tasks(config: &Config, notifier: &dyn Notifier) -> Result<Vec<Task>> {
    let theme = ColorfulTheme::default();
    let sources = source_menu();
    let kinds = task_menu();
    let mut tasks = Vec::new();

    loop {
        println!();
        let choice = Select::with_theme(&theme)
            .with_prompt(format!("Select source ({} task(s) added)", tasks.len()))
            .items(&sources)
            .default(0)
            .interact()?;

        let Some(&source) = Source::ALL.get(choice) else {
            break;
        };

        if let Some(reason) = unavailable_reason(source, config) {
            notifier.notify(NoticeLevel::Error, reason);
            continue;
        }

        let query: String = Input::with_theme(&theme)
            .with_prompt(source.query_hint())
            .validate_with(|input: &String| source.validate_query(input).map_err(|e| e.to_string()))
            .interact_text()?;

        let kind_index = Select::with_theme(&theme)
            .with_prompt("Select task")
            .items(&kinds)
            .default(0)
            .interact()?;
        let kind = TaskKind::ALL[kind_index.min(TaskKind::ALL.len() - 1)];

        let prompt: String = Input::with_theme(&theme)
            .with_prompt("Enter prompt (or press Enter for default)")
            .allow_empty(true)
            .interact_text()?;

        match Task::new(source, query, kind.as_str(), prompt) {
            Ok(task) => {
                notifier.notify(
                    NoticeLevel::Done,
                    &format!("Added {} task for {}", task.task_kind(), task.source()),
                );
                tasks.push(task);
            }
            Err(e) => notifier.notify(NoticeLevel::Error, &format!("Invalid task: {e}")),
        }
    }

    Ok(tasks)
}
