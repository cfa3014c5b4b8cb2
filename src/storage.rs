//! Persistent key/value store trait and implementations
//!
//! Values are opaque strings keyed by `"{namespace}.{key}"`. The resolver owns
//! the encoding; stores only keep the text.

use crate::error::{Error, Result};
use crate::sync::RwLockExt;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

#[cfg(feature = "json-file")]
use serde_json::{Map, Value};
#[cfg(feature = "json-file")]
use std::path::{Path, PathBuf};

/// Trait for persistent key/value stores
///
/// Any two handles that observe the same underlying data are "contexts" of one
/// store; writers should pair each mutation with a `ChangeSignal::notify`.
pub trait KeyValueStore: Send + Sync {
    /// Raw content stored at `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    fn keys(&self) -> Result<Vec<String>>;

    /// Short backend name used in logs
    fn backend_name(&self) -> &'static str;
}

// =============================================================================
// In-memory Store
// =============================================================================

/// In-memory store
///
/// Clones share the same map, so two clones behave like two browser tabs
/// sharing one local storage.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(map)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read_recovered().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read_recovered().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write_recovered()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write_recovered().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read_recovered().keys().cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.len())
            .finish()
    }
}

// =============================================================================
// JSON File Store
// =============================================================================

/// Store kept in one flat JSON object file
///
/// The file is re-read on every access so writes made by another process (or
/// another handle) are visible immediately. Writes are atomic: the new content
/// goes to `<file>.tmp` which is then renamed over the original.
///
/// A missing file is an empty store.
#[cfg(feature = "json-file")]
#[derive(Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    pretty: bool,
    write_lock: Arc<RwLock<()>>,
}

#[cfg(feature = "json-file")]
impl JsonFileStore {
    /// Create a store with pretty printed output
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
            write_lock: Arc::new(RwLock::new(())),
        }
    }

    /// Use compact JSON (no pretty printing)
    #[must_use]
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(Error::FileRead {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::Parse(format!(
                "'{}' must contain a JSON object",
                self.path.display()
            ))),
        }
    }

    fn save(&self, map: &Map<String, Value>) -> Result<()> {
        let content = if self.pretty {
            serde_json::to_string_pretty(map)?
        } else {
            serde_json::to_string(map)?
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        // Append .tmp to keep the original filename intact
        let file_name = self.path.file_name().ok_or_else(|| {
            Error::Storage(format!(
                "Invalid path '{}': must have a filename",
                self.path.display()
            ))
        })?;
        let mut temp_filename = file_name.to_os_string();
        temp_filename.push(".tmp");
        let temp_path = self.path.with_file_name(temp_filename);

        std::fs::write(&temp_path, content).map_err(|e| Error::FileWrite {
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &self.path).map_err(|e| Error::FileWrite {
            path: self.path.clone(),
            source: e,
        })
    }
}

#[cfg(feature = "json-file")]
impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        // Hand-edited files may hold non-string values; hand back their JSON text
        Ok(self.load()?.remove(key).map(|value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        }))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.write_recovered();
        let mut map = self.load()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.save(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.write_recovered();
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.load()?.keys().cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "json-file"
    }
}

#[cfg(feature = "json-file")]
impl fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .field("pretty", &self.pretty)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
