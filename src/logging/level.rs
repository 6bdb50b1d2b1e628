//! Console severity palette for log lines.

use colored::{ColoredString, Colorize};

/// Severity of a log line.
///
/// Levels affect console presentation only; the persisted file records every
/// level identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Neutral progress output.
    Plain,
    /// Low-value detail, dimmed on the console.
    Verbose,
    /// Internal wiring detail.
    Debug,
    /// A step completed successfully.
    Info,
    /// Something unexpected that the agent recovered from.
    Warn,
    /// A failure; the lifecycle continues unless documented otherwise.
    Error,
}

impl LogLevel {
    /// Renders `text` in this level's console color.
    pub fn paint(self, text: &str) -> ColoredString {
        match self {
            LogLevel::Plain => text.white(),
            LogLevel::Verbose => text.dimmed(),
            LogLevel::Debug => text.cyan(),
            LogLevel::Info => text.green(),
            LogLevel::Warn => text.yellow(),
            LogLevel::Error => text.red(),
        }
    }
}
