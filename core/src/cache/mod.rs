//! Response cache
//!
//! A key-value store mapping identifiers to previously fetched API data.
//! Reads happen before a fetch, writes after a successful one, and
//! `commit` persists pending writes.

mod error;

pub use error::CacheError;

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub trait ResponseCache {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value);

    /// Persist pending writes.
    fn commit(&mut self) -> Result<(), CacheError>;

    /// Typed lookup. An entry that no longer decodes is treated as a miss.
    fn get_as<T>(&self, key: &str) -> Option<T>
    where
        Self: Sized,
        T: DeserializeOwned,
    {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    fn set_as<T>(&mut self, key: &str, value: &T) -> Result<(), CacheError>
    where
        Self: Sized,
        T: Serialize,
    {
        let value = serde_json::to_value(value).map_err(|source| CacheError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.set(key, value);
        Ok(())
    }
}

/// Cache backed by a single JSON object on disk.
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
    dirty: bool,
}

impl JsonFileCache {
    /// Open the cache file, creating an empty one when it does not exist.
    ///
    /// A file that is not a JSON object is treated as empty and will be
    /// overwritten on the next commit.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();

        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, Value>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Cache file is not valid JSON, starting empty"
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let mut cache = Self {
                    path,
                    entries: BTreeMap::new(),
                    dirty: true,
                };
                cache.commit()?;
                tracing::info!(path = %cache.path.display(), "Created empty response cache");
                return Ok(cache);
            }
            Err(source) => return Err(CacheError::Read { path, source }),
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "Opened response cache");
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResponseCache for JsonFileCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
        self.dirty = true;
    }

    fn commit(&mut self) -> Result<(), CacheError> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| CacheError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string(&self.entries).map_err(|source| CacheError::Serialize {
            key: "*".to_string(),
            source,
        })?;

        // Write beside the target and rename so a failed write leaves the old file intact
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|source| CacheError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })?;

        self.dirty = false;
        Ok(())
    }
}

/// In-memory cache; `commit` is a no-op.
#[derive(Debug, Default, Clone)]
pub struct MemoryCache {
    entries: BTreeMap<String, Value>,
    commits: usize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of times `commit` was called
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn commit(&mut self) -> Result<(), CacheError> {
        self.commits += 1;
        Ok(())
    }
}
