// Server loop module
// Accepts connections until shutdown is requested, then tears down

use std::sync::Arc;

use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::error::ServerError;
use crate::logger;

/// Run the accept loop until the lifecycle manager requests shutdown.
///
/// Teardown is orderly: stop accepting, drop the listener, release the
/// session store, then return so the process can exit. Accept errors are
/// logged and the loop keeps going; one bad connection must not take the
/// server down.
pub async fn run(listener: TcpListener, state: Arc<AppState>) -> Result<(), ServerError> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = state.lifecycle.notified() => {
                break;
            }
        }
    }

    logger::log_shutdown("Shutdown requested, no longer accepting connections");
    drop(listener);

    state.store.shutdown().await;
    logger::log_shutdown("Session store closed, exiting");

    Ok(())
}
