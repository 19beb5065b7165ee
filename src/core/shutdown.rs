//! Turning termination signals into a job shutdown.
//!
//! Both Ctrl-C and SIGTERM set the shutdown flag instead of ending the
//! process, so the running tool is stopped and the job still unwinds
//! through its cleanup.

use tokio::sync::watch;
use tracing::warn;

/// Sets `shutdown_tx` to `true` on the first Ctrl-C or SIGTERM.
///
/// Handlers are installed before this returns.
///
/// # Errors
///
/// Returns an error if the SIGTERM handler cannot be installed.
pub fn forward_shutdown_signals(shutdown_tx: watch::Sender<bool>) -> std::io::Result<()> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::spawn(async move {
        #[cfg(unix)]
        let signal = tokio::select! {
            name = wait_for_ctrl_c() => name,
            _ = terminate.recv() => "SIGTERM",
        };
        #[cfg(not(unix))]
        let signal = wait_for_ctrl_c().await;

        warn!("Received {signal}, stopping the analysis tool");
        let _ = shutdown_tx.send(true);
    });
    Ok(())
}

async fn wait_for_ctrl_c() -> &'static str {
    if tokio::signal::ctrl_c().await.is_err() {
        // No handler, so no interrupt will ever be seen.
        std::future::pending::<()>().await;
    }
    "interrupt"
}
