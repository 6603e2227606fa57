//! Stable per-session identifier.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{debug, info, warn};

use super::storage::SessionStorage;

/// Default storage key for the session identifier.
pub const DEFAULT_SESSION_KEY: &str = "cyber-assistant-session-id";

/// Length of the random base-36 suffix.
const SUFFIX_LEN: usize = 7;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Obtains or creates the opaque id correlating every turn of a conversation.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    storage: Arc<dyn SessionStorage>,
    key: String,
}

impl SessionIdentity {
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Return the stored id, generating and storing one if absent.
    ///
    /// Storage failures are logged and degrade to a fresh, unpersisted id.
    pub fn get_or_create_session_id(&self) -> String {
        match self.storage.get(&self.key) {
            Ok(Some(id)) if !id.is_empty() => {
                debug!(name: "session.id.loaded", session_id = %id, "Session id loaded");
                return id;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(name: "session.storage.read_failed", error = %e, "Session storage unreadable");
            }
        }

        let id = generate_session_id();
        if let Err(e) = self.storage.set(&self.key, &id) {
            warn!(
                name: "session.storage.write_failed",
                error = %e,
                "Session id will not persist"
            );
        }
        info!(name: "session.id.created", session_id = %id, "Session id created");
        id
    }
}

/// Generate an id of the form `sess-<epoch-ms>-<7 base36 chars>`.
#[must_use]
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("sess-{}-{suffix}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::{MemoryStorage, StorageError};

    /// Storage that fails every operation.
    #[derive(Debug)]
    struct BrokenStorage;

    impl SessionStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Poisoned)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    #[test]
    fn test_generated_id_format() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "sess");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_same_scope_returns_same_id() {
        let identity = SessionIdentity::new(Arc::new(MemoryStorage::new()), DEFAULT_SESSION_KEY);
        let first = identity.get_or_create_session_id();
        let second = identity.get_or_create_session_id();
        assert_eq!(first, second);
    }

    #[test]
    fn test_existing_id_is_reused() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(DEFAULT_SESSION_KEY, "sess-1-abcdefg").unwrap();

        let identity = SessionIdentity::new(storage, DEFAULT_SESSION_KEY);
        assert_eq!(identity.get_or_create_session_id(), "sess-1-abcdefg");
    }

    #[test]
    fn test_separate_scopes_get_separate_ids() {
        let a = SessionIdentity::new(Arc::new(MemoryStorage::new()), DEFAULT_SESSION_KEY);
        let b = SessionIdentity::new(Arc::new(MemoryStorage::new()), DEFAULT_SESSION_KEY);
        assert_ne!(a.get_or_create_session_id(), b.get_or_create_session_id());
    }

    #[test]
    fn test_broken_storage_still_yields_id() {
        let identity = SessionIdentity::new(Arc::new(BrokenStorage), DEFAULT_SESSION_KEY);
        let id = identity.get_or_create_session_id();
        assert!(id.starts_with("sess-"));
    }
}
