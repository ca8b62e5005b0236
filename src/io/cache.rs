//! Persistent snapshot cache.
//!
//! A key maps to one envelope holding a full snapshot, the kind of thing it
//! is, and when it was written. Writers always replace the whole snapshot;
//! readers ask for a kind and a maximum age and get a miss for anything else.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Error type for snapshot cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("could not access cache entry {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
    #[error("invalid snapshot: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("cache lock poisoned")]
    Poisoned,
}

/// One stored snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub kind: String,
    pub saved_at: DateTime<Utc>,
    pub content: Value,
}

impl CacheEntry {
    pub fn new(kind: &str, content: Value) -> Self {
        CacheEntry {
            kind: kind.to_string(),
            saved_at: Utc::now(),
            content,
        }
    }

    /// Whether the entry is usable as `kind` at `now` under `max_age`.
    /// No max age means entries never expire.
    pub fn is_usable(&self, kind: &str, max_age: Option<Duration>, now: DateTime<Utc>) -> bool {
        if self.kind != kind {
            return false;
        }
        match max_age {
            Some(age) => now - self.saved_at <= age,
            None => true,
        }
    }
}

/// Process-wide key/value store of serialized snapshots
pub trait SnapshotCache: Send + Sync {
    /// Store `content` under `key`, replacing whatever was there.
    fn write(&self, key: &str, kind: &str, content: Value) -> Result<(), CacheError>;

    /// Read the snapshot under `key` if it is of `kind` and no older than
    /// `max_age`.
    fn read(&self, key: &str, kind: &str, max_age: Option<Duration>)
    -> Result<Option<Value>, CacheError>;

    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

// ---------------------------------------------------------------------------
// In-memory cache
// ---------------------------------------------------------------------------

/// Cache held in process memory (tests, short-lived tools)
#[derive(Debug, Default)]
pub struct MemorySnapshotCache {
    entries: Mutex<IndexMap<String, CacheEntry>>,
}

impl MemorySnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a prepared entry as-is, keeping its timestamp.
    pub fn put_entry(&self, key: &str, entry: CacheEntry) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    /// Keys in first-written order
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|e| e.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl SnapshotCache for MemorySnapshotCache {
    fn write(&self, key: &str, kind: &str, content: Value) -> Result<(), CacheError> {
        self.put_entry(key, CacheEntry::new(kind, content))
    }

    fn read(
        &self,
        key: &str,
        kind: &str,
        max_age: Option<Duration>,
    ) -> Result<Option<Value>, CacheError> {
        let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(entries
            .get(key)
            .filter(|e| e.is_usable(kind, max_age, Utc::now()))
            .map(|e| e.content.clone()))
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        entries.shift_remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed cache
// ---------------------------------------------------------------------------

/// Cache stored as one JSON file per key in a directory
#[derive(Debug, Clone)]
pub struct FileSnapshotCache {
    dir: PathBuf,
}

impl FileSnapshotCache {
    /// Open (creating if needed) a cache directory.
    pub fn open(dir: &Path) -> Result<Self, CacheError> {
        fs::create_dir_all(dir).map_err(|e| CacheError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(FileSnapshotCache {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }

    /// Read the raw envelope for `key`, if any. Unreadable or corrupt files
    /// count as absent.
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding corrupt cache entry");
                None
            }
        }
    }

    /// Store a prepared entry as-is, keeping its timestamp.
    pub fn put_entry(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        let content = serde_json::to_vec_pretty(entry)?;
        atomic_write(&path, &content).map_err(|e| CacheError::Io { path, source: e })
    }
}

impl SnapshotCache for FileSnapshotCache {
    fn write(&self, key: &str, kind: &str, content: Value) -> Result<(), CacheError> {
        debug!(key, kind, "writing snapshot");
        self.put_entry(key, &CacheEntry::new(kind, content))
    }

    fn read(
        &self,
        key: &str,
        kind: &str,
        max_age: Option<Duration>,
    ) -> Result<Option<Value>, CacheError> {
        let Some(entry) = self.entry(key) else {
            return Ok(None);
        };
        if entry.is_usable(kind, max_age, Utc::now()) {
            Ok(Some(entry.content))
        } else {
            debug!(key, kind, saved_at = %entry.saved_at, "snapshot stale or of another kind");
            Ok(None)
        }
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io { path, source: e }),
        }
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
