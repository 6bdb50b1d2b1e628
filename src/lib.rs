//! # vrstartup
//!
//! **vrstartup** is a background agent that binds its own lifecycle to a
//! host VR runtime: it waits until the runtime is reachable, registers
//! itself as an auto-launching component, and runs start hook scripts once
//! the runtime is ready. When stop hooks exist it also stays resident until
//! the runtime announces it is quitting, runs the stop hooks, and exits.
//!
//! ## Architecture
//! ```text
//!  foreground flow                      background worker flow
//!  ───────────────                      ──────────────────────
//!  first-run console gate ──open──► ReadinessGate
//!  final wait / OS signal ──cancel─► CancellationToken
//!                                        │
//!                                   Agent::run()
//!                                        │
//!            ┌───────────────────────────┼───────────────────────────┐
//!            ▼                           ▼                           ▼
//!       Connector                 ShutdownWatcher                Launcher
//!   (1 s retry → connect,      (1 s poll → quit event        (glob discovery →
//!    one-time registration)     → acknowledge)                detached spawn)
//!            │                           │                           │
//!            └───────────► LogBuffer ◄───┴───────────────────────────┘
//!                             │
//!                     flush at exit (capped file)
//! ```
//!
//! Every component writes diagnostics into the shared [`LogBuffer`]; the
//! buffer is persisted exactly once, when the lifecycle ends, into a
//! line-capped file whose existence doubles as the first-run signal.
//!
//! The VR runtime itself sits behind the [`RuntimeClient`] trait. The
//! `openvr` feature provides the SteamVR-backed implementation and enables
//! the agent binary; the default build is the pure library, exercised
//! against test doubles.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use vrstartup::{
//!     Agent, AgentConfig, AgentError, LogBuffer, ReadinessGate, RuntimeClient, RuntimeError,
//!     RuntimeEvent, ShellSpawner,
//! };
//!
//! struct IdleRuntime;
//!
//! #[async_trait]
//! impl RuntimeClient for IdleRuntime {
//!     async fn connect(&self) -> Result<(), RuntimeError> {
//!         Ok(())
//!     }
//!     async fn is_application_installed(&self, _app_key: &str) -> Result<bool, RuntimeError> {
//!         Ok(true)
//!     }
//!     async fn install_manifest(&self, _path: &std::path::Path) -> Result<(), RuntimeError> {
//!         Ok(())
//!     }
//!     async fn set_auto_launch(&self, _app_key: &str, _on: bool) -> Result<(), RuntimeError> {
//!         Ok(())
//!     }
//!     async fn disconnect(&self) {}
//!     async fn poll_next_event(&self) -> Result<Option<RuntimeEvent>, RuntimeError> {
//!         Ok(None)
//!     }
//!     async fn acknowledge_quit(&self) {}
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), AgentError> {
//!     let log = LogBuffer::new();
//!     let gate = ReadinessGate::new();
//!     gate.open();
//!
//!     let agent = Agent::new(
//!         AgentConfig::default(),
//!         log,
//!         gate,
//!         Arc::new(IdleRuntime),
//!         Arc::new(ShellSpawner),
//!     );
//!     agent.run(CancellationToken::new()).await
//! }
//! ```

mod core;
mod error;
mod logging;
mod runtime;
mod scripts;

// ---- Public re-exports ----

pub use crate::core::shutdown::wait_for_termination;
pub use crate::core::{Agent, AgentConfig, ReadinessGate};
pub use error::{AgentError, RuntimeError};
pub use logging::{persisted_log_exists, LogBuffer, LogEntry, LogLevel};
pub use runtime::{
    ConnectionState, Connector, RuntimeClient, RuntimeEvent, RuntimeEventKind, ShutdownWatcher,
};
pub use scripts::{Launcher, Phase, ScriptJob, ShellSpawner, Spawn};

#[cfg(feature = "openvr")]
pub use runtime::OpenVrClient;
