//! # Agent: the lifecycle orchestrator.
//!
//! [`Agent`] owns the connector, watcher, and launcher and sequences them
//! through the documented state machine:
//!
//! ```text
//! run(token):
//!   Connecting          ── connector.connect(), unbounded 1 s retry
//!      │ connected
//!   ReadyGate           ── wait for the readiness latch (console ack on
//!      │ open              first run, immediate otherwise)
//!   RunningStartHooks   ── launcher.run(start_dir)
//!      │
//!   CheckStopHooks      ── launcher.has_scripts(stop_dir)?
//!      │ yes                        │ no
//!   AwaitingQuit        ──┐         │
//!      │ quit ack'd       │         │
//!   RunningStopHooks    ◄─┴─────────┘   (dir still created, nothing to
//!      │                                 launch when empty)
//!   Disconnecting       ── connector.disconnect()
//!      │
//!   PersistingLog       ── log.flush(log_path, cap)
//!      │
//!   done (exit 0 in the binary)
//! ```
//!
//! ## Rules
//! - Hook and watch phases cannot abort the sequence: their failures are
//!   logged inside the owning component and the next phase runs regardless.
//! - Cancellation short-circuits whatever phase is suspended and falls
//!   through to the disconnect + flush tail; the log is persisted on every
//!   exit path short of an external kill.
//! - The flush error is the only one the caller sees.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::config::AgentConfig;
use crate::core::gate::ReadinessGate;
use crate::error::AgentError;
use crate::logging::LogBuffer;
use crate::runtime::{Connector, RuntimeClient, ShutdownWatcher};
use crate::scripts::{Launcher, Phase, Spawn};

/// Top-level lifecycle state machine.
///
/// Constructed once at process start from explicit component instances;
/// consumed by [`run`](Agent::run), which is the background worker flow.
pub struct Agent<C: RuntimeClient> {
    cfg: AgentConfig,
    log: LogBuffer,
    gate: ReadinessGate,
    connector: Connector<C>,
    watcher: ShutdownWatcher<C>,
    launcher: Launcher,
}

impl<C: RuntimeClient> Agent<C> {
    /// Wires an agent from its collaborators.
    pub fn new(
        cfg: AgentConfig,
        log: LogBuffer,
        gate: ReadinessGate,
        client: Arc<C>,
        spawner: Arc<dyn Spawn>,
    ) -> Self {
        let connector = Connector::new(
            client.clone(),
            log.clone(),
            cfg.retry_delay,
            cfg.app_key.clone(),
            cfg.manifest_path.clone(),
        );
        let watcher = ShutdownWatcher::new(client, log.clone(), cfg.poll_interval);
        let launcher = Launcher::new(log.clone(), spawner, cfg.pattern());
        Self {
            cfg,
            log,
            gate,
            connector,
            watcher,
            launcher,
        }
    }

    /// Drives the whole lifecycle to completion.
    ///
    /// Blocks until the documented terminal state (or cancellation) and
    /// persists the log as its final act. Only a log-persistence failure is
    /// returned; every other fault has already been logged and absorbed.
    pub async fn run(mut self, token: CancellationToken) -> Result<(), AgentError> {
        self.log.debug("Lifecycle worker started.");

        if self.connector.connect(&token).await && self.gate.wait(&token).await {
            self.run_hooks(&token).await;
        }

        self.connector.disconnect().await;
        self.log.info("Exiting.");
        self.log
            .flush(&self.cfg.log_path, self.cfg.line_limit_clamped())?;
        Ok(())
    }

    /// Start hooks, optional shutdown wait, stop hooks.
    ///
    /// Stop hooks launch only after an acknowledged quit event; a cancelled
    /// wait skips them so shutdown-side scripts never fire while the runtime
    /// is still up.
    async fn run_hooks(&self, token: &CancellationToken) {
        self.launcher.run(&self.cfg.start_dir, Phase::Start);

        if self.launcher.has_scripts(&self.cfg.stop_dir) {
            self.log
                .verbose("Stop scripts registered, waiting for the runtime to quit.");
            if !self.watcher.wait_for_quit(token).await {
                self.log.warn("Shutdown wait cancelled before a quit event.");
                return;
            }
        }

        self.launcher.run(&self.cfg.stop_dir, Phase::Stop);
    }
}
