//! # Shutdown watcher: polls the runtime for its quit signal.
//!
//! Only entered when the stop directory actually holds scripts; an agent
//! with no shutdown-side work never lingers. The loop is single-threaded
//! and cooperative: each tick drains the runtime's pending-event queue in
//! full, then sleeps for the poll interval.
//!
//! ## Rules
//! - The first quit event terminates the loop: it is acknowledged back to
//!   the runtime and the watcher returns. Events queued behind it are left
//!   unread; the session is about to be torn down.
//! - Every other event kind is ignored.
//! - A poll error is logged and the loop continues next tick; transient
//!   failures never abort the wait.
//! - The only exits are the quit signal and cancellation; there is no
//!   timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::logging::LogBuffer;
use crate::runtime::client::{RuntimeClient, RuntimeEventKind};

/// Blocks the lifecycle until the runtime announces it is quitting.
pub struct ShutdownWatcher<C: RuntimeClient> {
    client: Arc<C>,
    log: LogBuffer,
    poll_interval: Duration,
}

impl<C: RuntimeClient> ShutdownWatcher<C> {
    /// Creates a watcher polling at `poll_interval`.
    pub fn new(client: std::sync::Arc<C>, log: LogBuffer, poll_interval: Duration) -> Self {
        Self {
            client,
            log,
            poll_interval,
        }
    }

    /// Waits until a quit event is observed and acknowledged.
    ///
    /// Returns `true` when the quit signal was acknowledged, `false` when
    /// `token` was cancelled first.
    pub async fn wait_for_quit(&self, token: &CancellationToken) -> bool {
        loop {
            if self.drain_pending().await {
                return true;
            }

            let sleep = time::sleep(self.poll_interval);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = token.cancelled() => return false,
            }
        }
    }

    /// Drains the pending-event queue for one tick.
    ///
    /// Returns `true` if a quit event was seen and acknowledged.
    async fn drain_pending(&self) -> bool {
        loop {
            match self.client.poll_next_event().await {
                Ok(Some(event)) => match event.kind {
                    RuntimeEventKind::Quit => {
                        self.log.info("Runtime is quitting.");
                        self.client.acknowledge_quit().await;
                        return true;
                    }
                    RuntimeEventKind::Other(_) => {}
                },
                Ok(None) => return false,
                Err(e) => {
                    self.log.warn(format!("Event poll failed: {e}"));
                    return false;
                }
            }
        }
    }
}
