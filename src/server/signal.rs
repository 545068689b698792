// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGHUP:  Logged and ignored; configuration is fixed for the process lifetime

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Signal handler state
pub struct SignalHandler {
    /// Shutdown signal (SIGTERM, SIGINT)
    pub shutdown: Arc<Notify>,
    /// Whether shutdown has been requested
    pub shutdown_requested: AtomicBool,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(Notify::new()),
            shutdown_requested: AtomicBool::new(false),
        }
    }

    /// Mark shutdown and wake the server loop
    ///
    /// `notify_one` stores a permit, so a loop that is not yet waiting still
    /// sees the request.
    pub fn request_shutdown(&self, reason: &str) {
        if !self.shutdown_requested.swap(true, Ordering::SeqCst) {
            logger::log_shutdown(reason);
            self.shutdown.notify_one();
        }
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start signal handlers (Unix)
///
/// A signal that cannot be registered is logged and left at its default
/// disposition.
#[cfg(unix)]
#[allow(clippy::ignored_unit_patterns)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint, mut sighup) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
            signal(SignalKind::hangup()),
        ) {
            (Ok(term), Ok(int), Ok(hup)) => (term, int, hup),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                logger::log_error(&format!("Failed to register signal handlers: {e}"));
                return;
            }
        };

        logger::log_info(&format!(
            "Signal handlers registered (pid {})",
            std::process::id()
        ));

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    handler.request_shutdown("SIGTERM received");
                    break;
                }

                _ = sigint.recv() => {
                    handler.request_shutdown("SIGINT received");
                    break;
                }

                _ = sighup.recv() => {
                    logger::log_warning(
                        "SIGHUP received; configuration is loaded once, restart the process to apply changes",
                    );
                }
            }
        }
    });
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => handler.request_shutdown("Ctrl+C received"),
            Err(e) => logger::log_error(&format!("Failed to listen for Ctrl+C: {e}")),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_request_is_remembered() {
        let handler = SignalHandler::new();
        handler.request_shutdown("test");
        handler.request_shutdown("again");
        assert!(handler.shutdown_requested.load(Ordering::SeqCst));

        // the permit stored before anyone waited is still delivered
        tokio::time::timeout(Duration::from_secs(1), handler.shutdown.notified())
            .await
            .unwrap();
    }
}
