//! # Agent configuration.
//!
//! [`AgentConfig`] centralizes every path, pattern, and interval the
//! lifecycle uses. All fields are public; the defaults describe the
//! conventional working-directory layout the agent is deployed with.

use std::path::PathBuf;
use std::time::Duration;

use glob::Pattern;

/// Central configuration for one agent lifecycle.
///
/// ## Field semantics
/// - `log_path`: persisted log location; its existence is the first-run
///   signal
/// - `log_line_limit`: persisted log cap in lines (clamped to a minimum
///   of 1 at flush time)
/// - `start_dir` / `stop_dir`: hook folders, created on demand
/// - `script_pattern`: filename glob scripts must match
/// - `manifest_path`: application manifest handed to the runtime
/// - `app_key`: fixed application identifier used for registration and
///   auto-launch
/// - `retry_delay`: backoff between failed connect attempts
/// - `poll_interval`: shutdown watcher tick
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Persisted log location.
    pub log_path: PathBuf,
    /// Maximum persisted log length in lines.
    pub log_line_limit: usize,
    /// Directory scanned for start hooks.
    pub start_dir: PathBuf,
    /// Directory scanned for stop hooks.
    pub stop_dir: PathBuf,
    /// Filename glob a hook script must match.
    pub script_pattern: String,
    /// Application manifest consumed by the runtime.
    pub manifest_path: PathBuf,
    /// Application identifier for registration and auto-launch.
    pub app_key: String,
    /// Fixed backoff between failed connect attempts.
    pub retry_delay: Duration,
    /// Shutdown watcher poll interval.
    pub poll_interval: Duration,
}

impl AgentConfig {
    /// Compiles `script_pattern`; falls back to `*.cmd` if the configured
    /// pattern is malformed.
    pub fn pattern(&self) -> Pattern {
        Pattern::new(&self.script_pattern)
            .unwrap_or_else(|_| Pattern::new(Self::DEFAULT_PATTERN).expect("default pattern"))
    }

    /// Persisted log cap, clamped to a minimum of 1.
    pub fn line_limit_clamped(&self) -> usize {
        self.log_line_limit.max(1)
    }

    const DEFAULT_PATTERN: &'static str = "*.cmd";
}

impl Default for AgentConfig {
    /// Default configuration:
    ///
    /// - log `./startup.log`, capped at 100 lines
    /// - hooks in `./start` and `./stop`, matching `*.cmd`
    /// - manifest `./app.vrmanifest`, app key `vrstartup.agent`
    /// - 1 s connect backoff, 1 s shutdown poll
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("./startup.log"),
            log_line_limit: 100,
            start_dir: PathBuf::from("./start"),
            stop_dir: PathBuf::from("./stop"),
            script_pattern: Self::DEFAULT_PATTERN.to_owned(),
            manifest_path: PathBuf::from("./app.vrmanifest"),
            app_key: "vrstartup.agent".to_owned(),
            retry_delay: Duration::from_secs(1),
            poll_interval: Duration::from_secs(1),
        }
    }
}
