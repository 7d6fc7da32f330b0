//! In-memory session store
//!
//! Mirrors the MongoDB store's load/save semantics, including expiry, so
//! unit tests exercise the same middleware paths without a database.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::SessionData;

pub struct MemoryStore {
    sessions: Mutex<HashMap<String, Entry>>,
}

struct Entry {
    data: SessionData,
    expires: Instant,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Load a session that has not yet expired.
    pub fn load(&self, id: &str) -> Option<SessionData> {
        let sessions = self.sessions.lock().unwrap();
        let entry = sessions.get(id)?;
        if entry.expires <= Instant::now() {
            return None;
        }
        Some(entry.data.clone())
    }

    /// Insert or replace a session with a fresh expiry.
    pub fn save(&self, id: &str, data: SessionData, ttl: Duration) {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(
            id.to_string(),
            Entry {
                data,
                expires: Instant::now() + ttl,
            },
        );
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let store = MemoryStore::new();
        let mut data = SessionData::new();
        data.insert("visits".to_string(), serde_json::json!(1));

        store.save("s1", data.clone(), Duration::from_secs(60));
        assert_eq!(store.load("s1"), Some(data));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_session_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.load("nope"), None);
    }

    #[test]
    fn test_expired_session_is_none() {
        let store = MemoryStore::new();
        store.save("s1", SessionData::new(), Duration::ZERO);
        assert_eq!(store.load("s1"), None);
    }

    #[test]
    fn test_save_overwrites() {
        let store = MemoryStore::new();
        store.save("s1", SessionData::new(), Duration::from_secs(60));

        let mut updated = SessionData::new();
        updated.insert("k".to_string(), serde_json::json!("v"));
        store.save("s1", updated.clone(), Duration::from_secs(60));

        assert_eq!(store.load("s1"), Some(updated));
        assert_eq!(store.len(), 1);
    }
}
