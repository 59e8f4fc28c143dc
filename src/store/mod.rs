//! Namespaced JSON persistence for layout snapshots.
//!
//! [`PersistentStore`] serializes values with `serde_json` and hands the text
//! to a [`StorageBackend`] under `namespace + key`. Only writes report
//! failure to the caller. Reads, removals and clears log what went wrong and
//! carry on: a corrupt or unreadable snapshot is treated as absent.

mod backend;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Key prefix used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "wit-widget-";

/// Errors reported by [`PersistentStore::save`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend rejected the write (I/O failure, quota exceeded).
    #[error("Failed to write storage key {key}")]
    Write {
        /// Fully namespaced key.
        key: String,
        /// Underlying backend error.
        #[source]
        source: std::io::Error,
    },

    /// The value could not be serialized to JSON.
    #[error("Failed to serialize value for storage key {key}")]
    Serialize {
        /// Fully namespaced key.
        key: String,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value store with a namespace prefix over a [`StorageBackend`].
///
/// # Example
///
/// ```
/// use gridboard::store::{MemoryBackend, PersistentStore};
///
/// let store = PersistentStore::new(MemoryBackend::new());
/// store.save("answer", &42).expect("memory accepts writes");
/// assert_eq!(store.load::<u32>("answer"), Some(42));
/// assert_eq!(store.load::<u32>("missing"), None);
/// ```
#[derive(Debug, Clone)]
pub struct PersistentStore<B> {
    backend: B,
    namespace: String,
}

impl<B: StorageBackend> PersistentStore<B> {
    /// Store using [`DEFAULT_NAMESPACE`].
    pub fn new(backend: B) -> Self {
        Self::with_namespace(backend, DEFAULT_NAMESPACE)
    }

    /// Store using a custom key prefix.
    pub fn with_namespace(backend: B, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    /// The key prefix.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The underlying medium.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// Serialize `value` and write it under `key`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Serialize`] if `value` cannot be encoded, and
    /// [`StoreError::Write`] if the backend rejects the write.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let full_key = self.full_key(key);
        let json = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: full_key.clone(),
            source,
        })?;
        self.backend
            .write(&full_key, &json)
            .map_err(|source| StoreError::Write {
                key: full_key.clone(),
                source,
            })?;
        tracing::debug!(key = %full_key, bytes = json.len(), "saved");
        Ok(())
    }

    /// Read and decode the value under `key`.
    ///
    /// Returns `None` when the key is missing, unreadable or not valid JSON
    /// for `T`. The latter two are logged at error level.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = self.full_key(key);
        let raw = match self.backend.read(&full_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!(key = %full_key, error = %e, "failed to read stored value");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(key = %full_key, error = %e, "failed to parse stored value");
                None
            }
        }
    }

    /// Delete `key`. Failures are logged and otherwise ignored.
    pub fn remove(&self, key: &str) {
        let full_key = self.full_key(key);
        if let Err(e) = self.backend.delete(&full_key) {
            tracing::warn!(key = %full_key, error = %e, "failed to remove stored value");
        }
    }

    /// Delete every key under this store's namespace.
    ///
    /// Keys outside the namespace are left alone. Failures are logged and
    /// otherwise ignored.
    pub fn clear(&self) {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list stored keys");
                return;
            }
        };
        for key in keys.iter().filter(|k| k.starts_with(&self.namespace)) {
            if let Err(e) = self.backend.delete(key) {
                tracing::warn!(key = %key, error = %e, "failed to clear stored value");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Backend whose every operation fails.
    struct BrokenBackend;

    impl StorageBackend for BrokenBackend {
        fn write(&self, _key: &str, _contents: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only medium"))
        }
        fn read(&self, _key: &str) -> io::Result<Option<String>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "unreadable"))
        }
        fn delete(&self, _key: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only medium"))
        }
        fn keys(&self) -> io::Result<Vec<String>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "unlistable"))
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let store = PersistentStore::new(MemoryBackend::new());
        store
            .save("list", &vec!["a".to_string(), "b".to_string()])
            .expect("save");
        let loaded: Option<Vec<String>> = store.load("list");
        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn keys_are_namespaced() {
        let backend = MemoryBackend::new();
        let store = PersistentStore::new(backend.clone());
        store.save("widgets", &Vec::<u8>::new()).expect("save");
        assert_eq!(
            backend.keys().expect("keys"),
            vec!["wit-widget-widgets".to_string()]
        );
    }

    #[test]
    fn load_missing_key_is_none() {
        let store = PersistentStore::new(MemoryBackend::new());
        assert_eq!(store.load::<u32>("nothing"), None);
    }

    #[test]
    fn load_corrupt_value_is_none() {
        let backend = MemoryBackend::new();
        backend
            .write("wit-widget-widgets", "{not json")
            .expect("raw write");
        let store = PersistentStore::new(backend);
        assert_eq!(store.load::<Vec<u32>>("widgets"), None);
    }

    #[test]
    fn load_wrong_shape_is_none() {
        let store = PersistentStore::new(MemoryBackend::new());
        store.save("n", &"text").expect("save");
        assert_eq!(store.load::<u32>("n"), None);
    }

    #[test]
    fn load_read_failure_is_none() {
        let store = PersistentStore::new(BrokenBackend);
        assert_eq!(store.load::<u32>("anything"), None);
    }

    #[test]
    fn save_rejected_by_backend_is_write_error() {
        let store = PersistentStore::new(BrokenBackend);
        let err = store.save("widgets", &1).expect_err("backend rejects");
        match &err {
            StoreError::Write { key, .. } => assert_eq!(key, "wit-widget-widgets"),
            other => panic!("expected Write, got: {other:?}"),
        }
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn save_over_quota_is_write_error() {
        let store = PersistentStore::new(MemoryBackend::with_quota(16));
        let big = "x".repeat(64);
        let err = store.save("big", &big).expect_err("over quota");
        assert!(matches!(err, StoreError::Write { .. }));
    }

    #[test]
    fn save_unserializable_is_serialize_error() {
        use std::collections::HashMap;
        let store = PersistentStore::new(MemoryBackend::new());
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1u8);
        let err = store.save("map", &map).expect_err("non-string map keys");
        assert!(matches!(err, StoreError::Serialize { .. }));
    }

    #[test]
    fn remove_deletes_key() {
        let store = PersistentStore::new(MemoryBackend::new());
        store.save("k", &1).expect("save");
        store.remove("k");
        assert_eq!(store.load::<u32>("k"), None);
    }

    #[test]
    fn remove_and_clear_never_fail() {
        let store = PersistentStore::new(BrokenBackend);
        store.remove("k");
        store.clear();
    }

    #[test]
    fn clear_only_touches_own_namespace() {
        let backend = MemoryBackend::new();
        backend.write("other-app-key", "1").expect("raw write");
        let store = PersistentStore::new(backend.clone());
        store.save("a", &1).expect("save");
        store.save("b", &2).expect("save");

        store.clear();

        assert_eq!(backend.keys().expect("keys"), vec!["other-app-key".to_string()]);
    }

    #[test]
    fn custom_namespace() {
        let backend = MemoryBackend::new();
        let store = PersistentStore::with_namespace(backend.clone(), "board-");
        assert_eq!(store.namespace(), "board-");
        store.save("widgets", &0).expect("save");
        assert!(backend.read("board-widgets").expect("read").is_some());
    }

    #[test]
    fn file_backend_roundtrip() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let store = PersistentStore::new(FileBackend::new(tmp.path()));
        store.save("widgets", &vec![1, 2, 3]).expect("save");
        assert!(tmp.path().join("wit-widget-widgets.json").is_file());
        assert_eq!(store.load::<Vec<u32>>("widgets"), Some(vec![1, 2, 3]));
    }
}
