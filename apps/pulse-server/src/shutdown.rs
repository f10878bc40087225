use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// Resolves on SIGTERM or Ctrl-C.
pub async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}

/// Spawn a waiter that cancels `cancel` once a shutdown signal arrives.
pub fn cancel_on_signal(cancel: CancellationToken) {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(()) => tracing::info!("shutdown: signal received"),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "shutdown: signal listener failed; falling back to ctrl_c()"
                );
                let _ = tokio::signal::ctrl_c().await;
            }
        }
        cancel.cancel();
    });
}
