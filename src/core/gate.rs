//! Readiness latch between the connect phase and the start hooks.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// One-way boolean latch the orchestrator waits on before running start
/// hooks.
///
/// Subsequent runs open the gate immediately; a first run opens it only
/// after the console acknowledgment. Cheap to clone; all clones share the
/// same latch.
#[derive(Clone)]
pub struct ReadinessGate {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessGate {
    /// Creates a closed gate.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Opens the gate. Irreversible; waiters wake up at most once.
    pub fn open(&self) {
        let _ = self.tx.send(true);
    }

    /// Whether the gate has been opened.
    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    /// Waits until the gate opens or `token` is cancelled.
    ///
    /// Returns `true` if the gate is open, `false` on cancellation.
    pub async fn wait(&self, token: &CancellationToken) -> bool {
        let mut rx = self.tx.subscribe();
        tokio::select! {
            res = rx.wait_for(|open| *open) => res.is_ok(),
            _ = token.cancelled() => false,
        }
    }
}
