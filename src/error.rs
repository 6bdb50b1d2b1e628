//! Error types used by the agent and the runtime boundary.
//!
//! Two enums with different propagation rules:
//!
//! - [`RuntimeError`] — failures reported by the external VR runtime. These
//!   are logged and (except for the connect call, which drives the retry
//!   loop) never abort the lifecycle sequence.
//! - [`AgentError`] — the only error that crosses the orchestrator boundary.
//!   Today that is a log-persistence failure at exit; everything else
//!   terminates as a log line.

use thiserror::Error;

/// Failures reported by the external VR runtime.
///
/// The runtime communicates through result codes; the agent carries the
/// symbolic code name verbatim so the persisted log shows exactly what the
/// runtime said.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Session initialization failed (the connect call).
    #[error("runtime init failed: {code}")]
    Init {
        /// Symbolic init-error code as reported by the runtime.
        code: String,
    },

    /// An application-interface call failed (manifest install, auto-launch,
    /// installed-check).
    #[error("application call failed: {code}")]
    Application {
        /// Symbolic application-error code as reported by the runtime.
        code: String,
    },

    /// Reading the pending-event queue failed. Transient; the watcher
    /// retries on the next tick.
    #[error("event poll failed: {reason}")]
    Poll {
        /// Human-readable description of the poll failure.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for log lines.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Init { .. } => "runtime_init",
            RuntimeError::Application { .. } => "runtime_application",
            RuntimeError::Poll { .. } => "runtime_poll",
        }
    }
}

/// Errors raised by the agent itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AgentError {
    /// Writing the persisted log at exit failed. Best-effort by design: the
    /// process is terminating either way, so this is surfaced once and not
    /// retried.
    #[error("failed to persist log: {0}")]
    LogFlush(#[from] std::io::Error),
}
