//! Session middleware
//!
//! Runs on every request regardless of route: restores the session named by
//! the signed cookie, or creates a fresh one, and refreshes its expiry on
//! each interaction. Sessions are opaque string-keyed blobs; nothing in this
//! server reads or writes individual keys.

pub mod cookie;
#[cfg(test)]
mod memory;
mod mongo;

#[cfg(test)]
pub use memory::MemoryStore;
pub use mongo::MongoStore;

use std::time::Duration;

use crate::config::{AppState, SessionConfig};
use crate::error::ServerError;

/// Opaque session payload: arbitrary string-keyed JSON values.
pub type SessionData = serde_json::Map<String, serde_json::Value>;

/// Session store backend.
///
/// MongoDB in production; the in-memory variant backs unit tests so
/// handlers stay store-agnostic.
pub enum SessionStore {
    Mongo(MongoStore),
    #[cfg(test)]
    Memory(MemoryStore),
}

impl SessionStore {
    /// Connect to the MongoDB backend. Failure here is fatal at startup.
    pub async fn connect_mongo(cfg: &SessionConfig) -> Result<Self, ServerError> {
        Ok(Self::Mongo(MongoStore::connect(&cfg.mongodb_uri).await?))
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    /// Load a live session; expired or missing sessions are `None`.
    pub async fn load(&self, id: &str) -> Result<Option<SessionData>, ServerError> {
        match self {
            Self::Mongo(store) => Ok(store.load(id).await?),
            #[cfg(test)]
            Self::Memory(store) => Ok(store.load(id)),
        }
    }

    /// Persist a session with a fresh expiry. Last write wins.
    pub async fn save(
        &self,
        id: &str,
        data: &SessionData,
        ttl: Duration,
    ) -> Result<(), ServerError> {
        match self {
            Self::Mongo(store) => Ok(store.save(id, data, ttl).await?),
            #[cfg(test)]
            Self::Memory(store) => {
                store.save(id, data.clone(), ttl);
                Ok(())
            }
        }
    }

    /// Release store resources during orderly shutdown.
    pub async fn shutdown(&self) {
        match self {
            Self::Mongo(store) => store.shutdown().await,
            #[cfg(test)]
            Self::Memory(_) => {}
        }
    }
}

/// Session established for one request.
pub struct SessionHandle {
    pub id: String,
    /// True when no valid cookie accompanied the request; the response
    /// must then carry a `Set-Cookie` establishing the identifier.
    pub is_new: bool,
}

/// Restore-or-create the session for a request and refresh its expiry.
///
/// Tampered or malformed cookies are treated as absent, never as an error.
/// A valid cookie whose server-side session has expired keeps its
/// identifier; only the payload starts over.
pub async fn establish(
    state: &AppState,
    cookie_header: Option<&str>,
) -> Result<SessionHandle, ServerError> {
    let cfg = &state.config.session;

    let verified = cookie_header
        .and_then(|header| cookie::find(header, &cfg.cookie_name))
        .and_then(|value| cookie::verify(value, cfg.secret.as_bytes()));

    let (id, is_new, data) = match verified {
        Some(id) => {
            let data = state.store.load(&id).await?.unwrap_or_default();
            (id, false, data)
        }
        None => (uuid::Uuid::new_v4().to_string(), true, SessionData::new()),
    };

    state
        .store
        .save(&id, &data, Duration::from_millis(cfg.ttl_ms))
        .await?;

    Ok(SessionHandle { id, is_new })
}
