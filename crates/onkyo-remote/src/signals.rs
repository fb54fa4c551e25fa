//! Signal handling for shutdown.

use anyhow::Result;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tracing::info;

/// Listen for SIGTERM and SIGINT.
///
/// Returns a receiver that gets a message when either arrives.
pub fn setup_signal_handlers() -> Result<mpsc::Receiver<()>> {
    let (tx, rx) = mpsc::channel(1);
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = terminate.recv() => info!("Received SIGTERM"),
            Ok(()) = tokio::signal::ctrl_c() => info!("Received SIGINT"),
        }
        let _ = tx.send(()).await;
    });

    Ok(rx)
}
