//! Process shutdown on OS signals.
//!
//! Raw mode turns a terminal Ctrl-C into a key press, but signals sent from
//! outside (`kill`, a closing multiplexer, a service manager) still need a
//! clean exit: restore the terminal, let the current pass finish, exit 0.

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{info, warn};

/// Wait for SIGINT or, on unix, SIGTERM. Returns the signal name.
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|_| "Ctrl-C")
    }
}

/// Listen for shutdown signals on `handle`.
///
/// The returned receiver turns `true` on the first signal. If the handlers
/// cannot be installed it stays `false` and the failure is logged.
pub fn spawn_listener(handle: &Handle) -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    handle.spawn(async move {
        match wait_for_signal().await {
            Ok(name) => {
                info!(signal = name, "shutdown signal received");
                let _ = tx.send(true);
            }
            Err(e) => warn!(error = %e, "failed to install signal handlers"),
        }
    });
    rx
}

/// Whether a shutdown has been requested on `rx`.
pub fn requested(rx: &watch::Receiver<bool>) -> bool {
    *rx.borrow()
}
