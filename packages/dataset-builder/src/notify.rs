//! Operator status notifications.
//!
//! Components never print directly. They receive an `Arc<dyn Notifier>` at
//! construction and report progress through it, so the binary can show
//! styled console output while tests capture the messages.

use console::style;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Category of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Loading,
    Processing,
    Info,
    Warning,
    Error,
    Done,
}

impl NoticeLevel {
    pub fn glyph(&self) -> &'static str {
        match self {
            NoticeLevel::Loading => "⏳",
            NoticeLevel::Processing => "🔄",
            NoticeLevel::Info => "ℹ️",
            NoticeLevel::Warning => "⚠️",
            NoticeLevel::Error => "❌",
            NoticeLevel::Done => "✅",
        }
    }
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NoticeLevel::Loading => "loading",
            NoticeLevel::Processing => "processing",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
            NoticeLevel::Done => "done",
        };
        f.write_str(name)
    }
}

/// Sink for human-readable status messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Prints glyph-prefixed, colored messages to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Render a message the way it is printed, without the trailing newline.
    pub fn render(level: NoticeLevel, message: &str) -> String {
        let styled = match level {
            NoticeLevel::Loading | NoticeLevel::Processing => style(message).blue(),
            NoticeLevel::Info => style(message).cyan(),
            NoticeLevel::Warning => style(message).yellow(),
            NoticeLevel::Error => style(message).red(),
            NoticeLevel::Done => style(message).green(),
        };
        format!("{} {}", level.glyph(), styled)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        println!("{}", Self::render(level, message));
    }
}

/// Forwards notifications to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Loading | NoticeLevel::Processing => debug!(%level, "{}", message),
            NoticeLevel::Info | NoticeLevel::Done => info!(%level, "{}", message),
            NoticeLevel::Warning => warn!("{}", message),
            NoticeLevel::Error => error!("{}", message),
        }
    }
}
