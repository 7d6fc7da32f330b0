// Application state module
// The one context object constructed at startup; no ambient globals

use std::sync::Arc;

use super::types::Config;
use crate::server::Lifecycle;
use crate::session::SessionStore;

/// Application state, passed as `Arc<AppState>` to every connection.
pub struct AppState {
    pub config: Config,
    pub store: SessionStore,
    pub lifecycle: Arc<Lifecycle>,
}

impl AppState {
    pub fn new(config: Config, store: SessionStore, lifecycle: Arc<Lifecycle>) -> Self {
        Self {
            config,
            store,
            lifecycle,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State backed by the in-memory session store, for unit tests.
    pub fn for_tests() -> Self {
        Self::new(
            Config::for_tests(),
            SessionStore::in_memory(),
            Arc::new(Lifecycle::new()),
        )
    }
}
