// Lifecycle module
// Orderly shutdown coordination for signals and the /kill route
//
// Supported signals:
// - SIGTERM: graceful shutdown
// - SIGINT:  graceful shutdown (Ctrl+C)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shutdown coordinator shared between the accept loop, the signal
/// handler, and the `/kill` route.
pub struct Lifecycle {
    shutdown: Notify,
    requested: AtomicBool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            shutdown: Notify::new(),
            requested: AtomicBool::new(false),
        }
    }

    /// Request orderly shutdown. Idempotent; the stored permit means a
    /// request made before the accept loop starts waiting is not lost.
    pub fn request_shutdown(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.shutdown.notify_one();
    }

    /// Resolve when shutdown has been requested.
    pub async fn notified(&self) {
        self.shutdown.notified().await;
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Start signal handlers (Unix)
///
/// Spawns a background task that maps SIGTERM and SIGINT onto a shutdown
/// request, so signals and `/kill` go through the same teardown path.
#[cfg(unix)]
pub fn start_signal_handler(lifecycle: Arc<Lifecycle>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                crate::logger::log_shutdown("SIGTERM received");
            }
            _ = sigint.recv() => {
                crate::logger::log_shutdown("SIGINT received (Ctrl+C)");
            }
        }

        lifecycle.request_shutdown();
    });
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(lifecycle: Arc<Lifecycle>) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            crate::logger::log_shutdown("Ctrl+C received");
            lifecycle.request_shutdown();
        }
    });
}
