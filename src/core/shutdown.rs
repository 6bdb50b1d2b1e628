//! Cross-platform termination-signal future.
//!
//! Used by the binary to turn an OS termination request into cooperative
//! cancellation of the lifecycle worker. The worker itself never installs
//! signal handlers.

/// Completes when the process receives a termination signal.
///
/// Unix: `SIGINT` or `SIGTERM`. Elsewhere: Ctrl-C.
///
/// Returns `Err` only if signal listener registration fails.
#[cfg(unix)]
pub async fn wait_for_termination() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
    Ok(())
}

/// Completes when the process receives a termination signal.
///
/// Unix: `SIGINT` or `SIGTERM`. Elsewhere: Ctrl-C.
///
/// Returns `Err` only if signal listener registration fails.
#[cfg(not(unix))]
pub async fn wait_for_termination() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
