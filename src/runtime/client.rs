//! # The runtime client boundary.
//!
//! [`RuntimeClient`] is the seam between the agent and the host VR runtime.
//! The production implementation wraps the vendor API (see the `openvr`
//! feature); tests substitute a scripted double. The agent treats every
//! non-success result as loggable and non-fatal, except the connect call,
//! which drives the retry loop.

use async_trait::async_trait;
use std::path::Path;

use crate::error::RuntimeError;

/// Whether a runtime session is currently established.
///
/// Owned exclusively by the [`Connector`](super::Connector); the
/// orchestrator only reads it. The only reverse transition is the explicit
/// disconnect at process end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session; the connector keeps retrying.
    Disconnected,
    /// A session is established and registration has been attempted.
    Connected,
}

/// Classification of a polled runtime event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEventKind {
    /// The runtime session is terminating. The only kind the agent acts on.
    Quit,
    /// Any other event type, carried by its raw type code and ignored.
    Other(u32),
}

/// One event drained from the runtime's pending-event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeEvent {
    /// What the runtime reported.
    pub kind: RuntimeEventKind,
}

impl RuntimeEvent {
    /// Shorthand for a quit event.
    pub fn quit() -> Self {
        Self {
            kind: RuntimeEventKind::Quit,
        }
    }

    /// Shorthand for an ignorable event with the given raw type code.
    pub fn other(code: u32) -> Self {
        Self {
            kind: RuntimeEventKind::Other(code),
        }
    }
}

/// Client session with the host VR runtime.
///
/// Implementations own whatever session state the vendor API needs behind
/// `&self`; all methods may be called from the single lifecycle worker flow.
#[async_trait]
pub trait RuntimeClient: Send + Sync + 'static {
    /// Attempts to establish the runtime session.
    async fn connect(&self) -> Result<(), RuntimeError>;

    /// Whether `app_key` is already registered with the runtime.
    async fn is_application_installed(&self, app_key: &str) -> Result<bool, RuntimeError>;

    /// Registers the application manifest file at `path` with the runtime.
    async fn install_manifest(&self, path: &Path) -> Result<(), RuntimeError>;

    /// Opts `app_key` in or out of launching together with the runtime.
    async fn set_auto_launch(&self, app_key: &str, enabled: bool) -> Result<(), RuntimeError>;

    /// Tears the session down. Idempotent; safe to call when never connected.
    async fn disconnect(&self);

    /// Pops the next pending event, or `None` when the queue is drained.
    async fn poll_next_event(&self) -> Result<Option<RuntimeEvent>, RuntimeError>;

    /// Confirms to the runtime that the agent observed its quit signal and
    /// is exiting.
    async fn acknowledge_quit(&self);
}
