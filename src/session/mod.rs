//! Session identity and the storage scope that keeps it.
//!
//! The session id is an opaque string sent with every turn so the remote
//! assistant can correlate a conversation. It carries no authentication
//! meaning.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cyber_assistant::session::{DEFAULT_SESSION_KEY, MemoryStorage, SessionIdentity};
//!
//! let identity = SessionIdentity::new(Arc::new(MemoryStorage::new()), DEFAULT_SESSION_KEY);
//! let id = identity.get_or_create_session_id();
//! assert_eq!(id, identity.get_or_create_session_id());
//! ```

mod identity;
mod storage;

use std::path::PathBuf;
use std::sync::Arc;

pub use identity::{DEFAULT_SESSION_KEY, SessionIdentity, generate_session_id};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError, StorageScope};

/// Build the storage backend for a scope.
///
/// `path` only applies to [`StorageScope::Persistent`]; `None` selects
/// [`FileStorage::default_path`].
#[must_use]
pub fn storage_for_scope(scope: StorageScope, path: Option<PathBuf>) -> Arc<dyn SessionStorage> {
    match scope {
        StorageScope::Tab => Arc::new(MemoryStorage::new()),
        StorageScope::Persistent => Arc::new(FileStorage::new(
            path.unwrap_or_else(FileStorage::default_path),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistent_scope_resumes_id_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let first_run = SessionIdentity::new(
            storage_for_scope(StorageScope::Persistent, Some(path.clone())),
            DEFAULT_SESSION_KEY,
        );
        let id = first_run.get_or_create_session_id();

        let second_run = SessionIdentity::new(
            storage_for_scope(StorageScope::Persistent, Some(path)),
            DEFAULT_SESSION_KEY,
        );
        assert_eq!(second_run.get_or_create_session_id(), id);
    }

    #[test]
    fn test_tab_scope_starts_fresh_each_run() {
        let first_run =
            SessionIdentity::new(storage_for_scope(StorageScope::Tab, None), DEFAULT_SESSION_KEY);
        let second_run =
            SessionIdentity::new(storage_for_scope(StorageScope::Tab, None), DEFAULT_SESSION_KEY);

        let id = first_run.get_or_create_session_id();
        assert_eq!(first_run.get_or_create_session_id(), id);
        assert_ne!(second_run.get_or_create_session_id(), id);
    }

    #[test]
    fn test_corrupt_persistent_file_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ truncated").unwrap();

        let id = SessionIdentity::new(
            storage_for_scope(StorageScope::Persistent, Some(path.clone())),
            DEFAULT_SESSION_KEY,
        )
        .get_or_create_session_id();

        let resumed = SessionIdentity::new(
            storage_for_scope(StorageScope::Persistent, Some(path)),
            DEFAULT_SESSION_KEY,
        )
        .get_or_create_session_id();
        assert_eq!(resumed, id);
    }
}
