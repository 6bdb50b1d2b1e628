//! # In-memory log buffer with capped flush-to-file.
//!
//! [`LogBuffer`] collects timestamped lines for the whole process lifetime
//! and writes them out exactly once, at exit. The persisted file is capped
//! to a configured number of lines; when the cap is exceeded the oldest
//! lines are dropped and a single truncation notice becomes line 0.
//!
//! ## Rules
//! - Appends preserve order; the mutex is held across flush so a flush never
//!   loses an entry appended before it was called and never includes one
//!   appended after it returns.
//! - Flush **overwrites** the file (never append-mode); that is how the cap
//!   is enforced against previous runs.
//! - A flush with an empty buffer is a no-op: the file is not rewritten and
//!   not created.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};

use super::level::LogLevel;

/// Timestamp layout of persisted lines (millisecond precision).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// One recorded diagnostic line. Immutable once created.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Wall-clock time of the append.
    pub at: DateTime<Local>,
    /// Console severity of the line.
    pub level: LogLevel,
    /// Line content, without the timestamp.
    pub text: String,
}

impl LogEntry {
    /// Renders the entry the way it is persisted: `<timestamp> <text>`.
    pub fn render(&self) -> String {
        format!("{} {}", self.at.format(TIMESTAMP_FORMAT), self.text)
    }
}

/// Shared, ordered diagnostics sink.
///
/// Cheap to clone (internally an `Arc`); every component holds a handle and
/// appends through it. At most two flows write concurrently (the console
/// flow and the lifecycle worker), serialized by the internal mutex.
#[derive(Clone)]
pub struct LogBuffer {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    echo: bool,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBuffer {
    /// Creates a buffer that echoes every append to the console.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            echo: true,
        }
    }

    /// Creates a buffer with the console echo disabled.
    ///
    /// Used by tests and by embedders that present diagnostics elsewhere.
    pub fn muted() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            echo: false,
        }
    }

    /// Appends a line with the current timestamp and echoes it to the
    /// console in the level's color.
    pub fn append(&self, level: LogLevel, text: impl Into<String>) {
        let entry = LogEntry {
            at: Local::now(),
            level,
            text: text.into(),
        };
        if self.echo {
            println!("{}", level.paint(&entry.text));
        }
        self.lock().push(entry);
    }

    /// Appends at [`LogLevel::Plain`].
    pub fn plain(&self, text: impl Into<String>) {
        self.append(LogLevel::Plain, text);
    }

    /// Appends at [`LogLevel::Verbose`].
    pub fn verbose(&self, text: impl Into<String>) {
        self.append(LogLevel::Verbose, text);
    }

    /// Appends at [`LogLevel::Debug`].
    pub fn debug(&self, text: impl Into<String>) {
        self.append(LogLevel::Debug, text);
    }

    /// Appends at [`LogLevel::Info`].
    pub fn info(&self, text: impl Into<String>) {
        self.append(LogLevel::Info, text);
    }

    /// Appends at [`LogLevel::Warn`].
    pub fn warn(&self, text: impl Into<String>) {
        self.append(LogLevel::Warn, text);
    }

    /// Appends at [`LogLevel::Error`].
    pub fn error(&self, text: impl Into<String>) {
        self.append(LogLevel::Error, text);
    }

    /// Number of buffered (not yet flushed) entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the buffer currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the rendered buffered lines, oldest first.
    ///
    /// Diagnostic accessor; the lifecycle itself never reads the buffer back
    /// outside of [`flush`](Self::flush).
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().iter().map(LogEntry::render).collect()
    }

    /// Drains the buffer into the file at `path`, enforcing `line_limit`.
    ///
    /// Existing file lines are kept in front of the buffered entries. When
    /// the combined count exceeds the cap, the oldest lines are dropped so
    /// that the notice line plus the newest lines fit exactly within it.
    /// `line_limit` is clamped to a minimum of 1.
    ///
    /// The mutex is held across the file write, so entries appended
    /// concurrently with a flush land in the buffer for the next one.
    ///
    /// Filesystem failures propagate to the caller and leave the buffered
    /// entries in place.
    pub fn flush(&self, path: &Path, line_limit: usize) -> std::io::Result<()> {
        let mut entries = self.lock();
        if entries.is_empty() {
            return Ok(());
        }
        let limit = line_limit.max(1);

        let mut lines: Vec<String> = match fs::read_to_string(path) {
            Ok(existing) => existing.lines().map(str::to_owned).collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        lines.extend(entries.iter().map(LogEntry::render));

        if lines.len() > limit {
            let keep = limit - 1;
            lines.drain(..lines.len() - keep);
            lines.insert(0, truncation_notice(limit));
        }

        let mut file = fs::File::create(path)?;
        for line in &lines {
            writeln!(file, "{line}")?;
        }
        entries.clear();
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
        // A poisoned mutex only means another flow panicked mid-append; the
        // entries themselves are still a valid prefix worth persisting.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Whether a persisted log already exists at `path`.
///
/// This is the agent's only first-run signal: no file means the agent has
/// never completed a lifecycle in this directory.
pub fn persisted_log_exists(path: &Path) -> bool {
    path.is_file()
}

fn truncation_notice(limit: usize) -> String {
    format!("(Log is limited to {limit} lines and has been truncated)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lines_of(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn test_flush_preserves_append_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("startup.log");
        let log = LogBuffer::muted();

        log.plain("first");
        log.info("second");
        log.error("third");
        log.flush(&path, 100).unwrap();

        let lines = lines_of(&path);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("first"));
        assert!(lines[1].ends_with("second"));
        assert!(lines[2].ends_with("third"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_flush_appends_after_existing_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("startup.log");
        fs::write(&path, "old-1\nold-2\n").unwrap();

        let log = LogBuffer::muted();
        log.plain("new-1");
        log.flush(&path, 100).unwrap();

        let lines = lines_of(&path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "old-1");
        assert_eq!(lines[1], "old-2");
        assert!(lines[2].ends_with("new-1"));
    }

    #[test]
    fn test_flush_caps_lines_and_prepends_notice() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("startup.log");
        let log = LogBuffer::muted();

        for i in 0..150 {
            log.plain(format!("line-{i}"));
        }
        log.flush(&path, 100).unwrap();

        let lines = lines_of(&path);
        assert_eq!(lines.len(), 100);
        assert_eq!(
            lines[0],
            "(Log is limited to 100 lines and has been truncated)"
        );
        // Newest 99 entries survive: line-51 .. line-149.
        assert!(lines[1].ends_with("line-51"));
        assert!(lines[99].ends_with("line-149"));
    }

    #[test]
    fn test_flush_caps_against_existing_file_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("startup.log");
        let existing: Vec<String> = (0..98).map(|i| format!("old-{i}")).collect();
        fs::write(&path, existing.join("\n")).unwrap();

        let log = LogBuffer::muted();
        log.plain("new-0");
        log.plain("new-1");
        log.plain("new-2");
        log.flush(&path, 100).unwrap();

        let lines = lines_of(&path);
        assert_eq!(lines.len(), 100);
        assert!(lines[0].starts_with("(Log is limited"));
        assert_eq!(lines[1], "old-2");
        assert!(lines[99].ends_with("new-2"));
    }

    #[test]
    fn test_second_flush_with_empty_buffer_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("startup.log");
        let log = LogBuffer::muted();

        log.plain("only");
        log.flush(&path, 100).unwrap();
        let before = fs::read(&path).unwrap();

        log.flush(&path, 100).unwrap();
        let after = fs::read(&path).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_empty_buffer_flush_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("startup.log");

        LogBuffer::muted().flush(&path, 100).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_line_limit_clamped_to_one() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("startup.log");
        let log = LogBuffer::muted();

        log.plain("a");
        log.plain("b");
        log.flush(&path, 0).unwrap();

        let lines = lines_of(&path);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "(Log is limited to 1 lines and has been truncated)");
    }

    #[test]
    fn test_entry_render_has_millisecond_timestamp() {
        let log = LogBuffer::muted();
        log.plain("stamped");
        let line = &log.snapshot()[0];
        // "YYYY-MM-DD HH:MM:SS.mmm stamped"
        assert_eq!(line.len(), "YYYY-MM-DD HH:MM:SS.mmm ".len() + "stamped".len());
        assert!(line.ends_with(" stamped"));
        assert_eq!(&line[4..5], "-");
        assert_eq!(&line[10..11], " ");
        assert_eq!(&line[19..20], ".");
    }

    #[test]
    fn test_persisted_log_exists_tracks_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("startup.log");
        assert!(!persisted_log_exists(&path));

        let log = LogBuffer::muted();
        log.plain("line");
        log.flush(&path, 10).unwrap();
        assert!(persisted_log_exists(&path));
    }
}
