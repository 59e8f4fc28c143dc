//! Storage media behind [`PersistentStore`](super::PersistentStore).
//!
//! A backend is a flat string-to-string key/value medium. Keys arrive already
//! namespaced; backends never interpret them.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::config::xdg;

/// A key/value medium for serialized snapshots.
pub trait StorageBackend {
    /// Store `contents` under `key`, replacing any previous value.
    fn write(&self, key: &str, contents: &str) -> io::Result<()>;

    /// Read the value under `key`. A missing key is `Ok(None)`.
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Delete `key`. Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> io::Result<()>;

    /// List every stored key.
    fn keys(&self) -> io::Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// FileBackend
// ---------------------------------------------------------------------------

const FILE_EXTENSION: &str = "json";

/// One `<key>.json` file per key inside a directory.
///
/// The directory is created on first write with mode 0700. Writes go to a
/// `<key>.json.tmp.<pid>` sibling that is synced and then renamed over the
/// key file, so a reader sees either the old contents or the new ones.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `dir`. Nothing is touched on disk yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the key files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{FILE_EXTENSION}"))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{key}.{FILE_EXTENSION}.tmp.{}", std::process::id()))
    }
}

/// Write `contents` to `temp`, sync it, and rename it over `path`.
fn write_atomic(path: &Path, temp: &Path, contents: &str) -> io::Result<()> {
    let mut file = fs::File::create(temp)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    fs::rename(temp, path)
}

impl StorageBackend for FileBackend {
    fn write(&self, key: &str, contents: &str) -> io::Result<()> {
        xdg::ensure_dir(&self.dir)?;
        let temp = self.temp_path_for(key);
        let result = write_atomic(&self.path_for(key), &temp, contents);
        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result
    }

    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn delete(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn keys(&self) -> io::Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

// ---------------------------------------------------------------------------
// MemoryBackend
// ---------------------------------------------------------------------------

/// In-process map, shared between clones.
///
/// An optional byte quota makes writes fail once the total stored size would
/// exceed it, the way a browser's local storage rejects oversized values.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    /// Unlimited in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory backend holding at most `bytes` of keys plus values.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for MemoryBackend {
    fn write(&self, key: &str, contents: &str) -> io::Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if let Some(quota) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = used + key.len() + contents.len();
            if needed > quota {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("storage quota exceeded: {needed} > {quota} bytes"),
                ));
            }
        }
        entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn read(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn delete(&self, key: &str) -> io::Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> io::Result<Vec<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.keys().cloned().collect())
    }
}
