//! Response cache persisted as a single JSON document
//!
//! Provides a `ResponseCache` that keeps every fetched response in memory,
//! keyed by URL or name, and rewrites the whole backing file after each new
//! entry so the next run can replay it without touching the network.

use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use super::payload::{CachePayload, Cacheable, PayloadError};

/// Default location of the cache file, relative to the working directory
pub const DEFAULT_CACHE_FILE: &str = "nps_cache.json";

/// Key under which the state directory is cached
pub const STATE_DIRECTORY_KEY: &str = "state_url_dict";

/// Errors reading or writing the cache file
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file exists but could not be read
    #[error("failed to read cache file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cache file is not a JSON object
    #[error("cache file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The cache file could not be written
    #[error("failed to write cache file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An entry could not be encoded for storage
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Reads the entries stored in a cache file
///
/// # Returns
/// * `Ok(Some(entries))` if the file holds a JSON object
/// * `Ok(None)` if the file does not exist
/// * `Err(CacheError::Corrupt)` if the contents are not a JSON object
/// * `Err(CacheError::Read)` for any other I/O failure
pub fn read_entries(path: &Path) -> Result<Option<Map<String, Value>>, CacheError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CacheError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| CacheError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

/// In-memory map of cached responses, mirrored to a JSON file
///
/// Entries are only ever added or overwritten within a session. Every `put`
/// rewrites the full document rather than appending a delta.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    /// Backing file; `None` keeps the cache purely in memory
    path: Option<PathBuf>,
    entries: Map<String, Value>,
}

impl ResponseCache {
    /// Loads the cache stored at `path`
    ///
    /// A missing file gives an empty cache. A file that cannot be read or
    /// parsed also gives an empty cache, after logging a warning; its
    /// entries are overwritten by the next `put` or `save`.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(Some(entries)) => {
                tracing::debug!(path = %path.display(), entries = entries.len(), "loaded cache");
                entries
            }
            Ok(None) => {
                tracing::debug!(path = %path.display(), "no cache file, starting empty");
                Map::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unusable cache file");
                Map::new()
            }
        };

        Self {
            path: Some(path),
            entries,
        }
    }

    /// Creates a cache that never touches the filesystem
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the raw cached value for `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Inserts or overwrites an entry, then persists the whole cache
    pub fn put(&mut self, key: impl Into<String>, value: Value) -> Result<(), CacheError> {
        self.entries.insert(key.into(), value);
        self.save()
    }

    /// Writes every entry to the backing file, replacing it atomically
    pub fn save(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string(&self.entries).map_err(|e| CacheError::Write {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        let write_error = |source: io::Error| CacheError::Write {
            path: path.clone(),
            source,
        };

        // Stage the document next to the cache file and rename it into place,
        // so an interrupted write leaves the previous cache intact.
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir).map_err(write_error)?;
        staged.write_all(json.as_bytes()).map_err(write_error)?;
        staged.as_file().sync_all().map_err(write_error)?;
        staged.persist(path).map_err(|e| write_error(e.error))?;
        Ok(())
    }

    /// Reads `key` as a typed value
    ///
    /// Returns `None` if the key is absent or its value does not have the
    /// shape of `T`; the latter is logged so the caller can refetch.
    pub fn get_typed<T: Cacheable>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match CachePayload::decode(T::KIND, value) {
            Ok(payload) => T::from_payload(payload),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding cached entry");
                None
            }
        }
    }

    /// Stores a typed value under `key` and persists the cache
    pub fn put_typed<T: Cacheable + Clone>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), CacheError> {
        let encoded = value.clone().into_payload().encode()?;
        self.put(key, encoded)
    }
}
