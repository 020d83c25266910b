// Accept loop module
// Accepts connections until a shutdown signal arrives, then drains in-flight connections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::{start_signal_handler, ShutdownSignal};
use crate::config::AppState;
use crate::logger;

/// Upper bound on how long in-flight connections may keep the process alive
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop until SIGTERM/SIGINT.
///
/// Must be called from within a `LocalSet`.
pub async fn run_server(
    listener: TcpListener,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Arc::new(ShutdownSignal::new());
    start_signal_handler(Arc::clone(&shutdown));
    serve_until(listener, state, shutdown).await
}

/// Accept loop driven by an explicit shutdown handle
pub async fn serve_until(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<ShutdownSignal>,
) -> Result<(), Box<dyn std::error::Error>> {
    let active_connections = Arc::new(AtomicUsize::new(0));

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

            () = shutdown.wait() => break,
        }
    }

    // Stop accepting before draining
    drop(listener);
    let remaining = drain_connections(&active_connections, DRAIN_TIMEOUT).await;
    logger::log_shutdown(remaining);
    Ok(())
}

/// Wait for the active connection count to reach zero or the deadline to pass.
/// Returns the number of connections still open.
async fn drain_connections(active: &AtomicUsize, timeout: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let count = active.load(Ordering::SeqCst);
        if count == 0 || tokio::time::Instant::now() >= deadline {
            return count;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
