//! # Runtime connector: unbounded connect retry plus one-time registration.
//!
//! The connector owns the single connection attempt/retry loop. There is no
//! maximum retry count on purpose: the agent exists to wait for the runtime
//! to come up, however long that takes. Each failed attempt is logged with
//! the runtime's error code and followed by a fixed backoff sleep.
//!
//! ## Flow
//! ```text
//! loop {
//!   ├─► client.connect()
//!   │     ├─ Ok  ──► state = Connected
//!   │     │          └─► register():
//!   │     │                ├─ installed check (skip everything if true)
//!   │     │                ├─ install_manifest   (best-effort, logged)
//!   │     │                └─ set_auto_launch    (best-effort, logged)
//!   │     └─ Err ──► log error code
//!   │                sleep(retry_delay)   (cancellable)
//!   └─ exit: connected, or cancellation observed
//! }
//! ```
//!
//! ## Rules
//! - A failed attempt is never sticky; the next tick retries from scratch.
//! - Registration runs once per successful connect and its two
//!   sub-operations are attempted independently; neither failure blocks the
//!   other or the lifecycle.
//! - Cancellation is observed before each attempt and during the backoff
//!   sleep.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::logging::LogBuffer;
use crate::runtime::client::{ConnectionState, RuntimeClient};

/// Owns the runtime connection lifecycle and its registration side effects.
pub struct Connector<C: RuntimeClient> {
    client: Arc<C>,
    log: LogBuffer,
    retry_delay: Duration,
    app_key: String,
    manifest_path: PathBuf,
    state: ConnectionState,
}

impl<C: RuntimeClient> Connector<C> {
    /// Creates a disconnected connector.
    pub fn new(
        client: Arc<C>,
        log: LogBuffer,
        retry_delay: Duration,
        app_key: impl Into<String>,
        manifest_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            log,
            retry_delay,
            app_key: app_key.into(),
            manifest_path: manifest_path.into(),
            state: ConnectionState::Disconnected,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Retries `connect` until it succeeds or `token` is cancelled.
    ///
    /// Returns `true` once connected (registration already attempted),
    /// `false` when cancellation won the race.
    pub async fn connect(&mut self, token: &CancellationToken) -> bool {
        loop {
            if token.is_cancelled() {
                return false;
            }
            match self.client.connect().await {
                Ok(()) => {
                    self.state = ConnectionState::Connected;
                    self.log.info("Runtime initialized successfully.");
                    self.register().await;
                    return true;
                }
                Err(e) => {
                    self.log.error(format!("Runtime initialization errored: {e}"));
                    let sleep = time::sleep(self.retry_delay);
                    tokio::pin!(sleep);
                    select! {
                        _ = &mut sleep => {}
                        _ = token.cancelled() => return false,
                    }
                }
            }
        }
    }

    /// Tears down the session. Safe to call when never connected.
    pub async fn disconnect(&mut self) {
        self.client.disconnect().await;
        self.state = ConnectionState::Disconnected;
    }

    /// One-time registration: manifest install plus auto-launch opt-in,
    /// guarded by the runtime's own "already installed" check so repeated
    /// runs are no-ops.
    async fn register(&self) {
        match self.client.is_application_installed(&self.app_key).await {
            Ok(true) => {
                self.log
                    .verbose("Application already registered, skipping registration.");
                return;
            }
            Ok(false) => {}
            // Treated as "not installed": both sub-operations below are
            // best-effort anyway.
            Err(e) => self
                .log
                .warn(format!("Installed-check failed, registering anyway: {e}")),
        }

        match self.client.install_manifest(&self.manifest_path).await {
            Ok(()) => self.log.info("Application manifest registered."),
            Err(e) => self
                .log
                .error(format!("Failed to register application manifest: {e}")),
        }

        match self.client.set_auto_launch(&self.app_key, true).await {
            Ok(()) => self.log.info("Application set to auto-launch with the runtime."),
            Err(e) => self.log.error(format!("Failed to set auto-launch: {e}")),
        }
    }
}
