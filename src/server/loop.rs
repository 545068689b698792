// Server loop module
// Accepts connections until a shutdown signal arrives, then drains

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Longest wait for in-flight connections after shutdown
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept connections until `shutdown` fires
///
/// Once notified, the listener is closed and open connections get up to
/// `DRAIN_TIMEOUT` to finish.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = shutdown.notified() => {
                break;
            }
        }
    }

    drop(listener);
    drain_connections(&active_connections).await;
}

/// Wait for the active connection count to reach zero, bounded by `DRAIN_TIMEOUT`
async fn drain_connections(active_connections: &AtomicUsize) {
    let waited = tokio::time::timeout(DRAIN_TIMEOUT, async {
        while active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    })
    .await;

    if waited.is_err() {
        logger::log_warning(&format!(
            "Shutdown with {} connection(s) still open",
            active_connections.load(Ordering::SeqCst)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        let counter = AtomicUsize::new(0);
        tokio::time::timeout(Duration::from_secs(1), drain_connections(&counter))
            .await
            .unwrap();
    }
}
