//! Platform settings store
//!
//! The host platform keeps hook registrations and feature flags in a flat
//! key-value settings table. The registry never touches that table through
//! ambient globals; everything goes through the [`SettingsStore`] trait so
//! callers can inject a file-backed store, a test double, or an adapter
//! over the live platform.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;

/// Key-value access to the platform settings table.
///
/// Writes are whole-value: the caller always supplies the complete
/// replacement string for a key. Concurrent write serialization is the
/// host's job, not the store's.
pub trait SettingsStore {
    /// Snapshot of every key-value pair, sorted by key.
    fn all(&self) -> BTreeMap<String, String>;

    /// Read a single value.
    fn get(&self, key: &str) -> Option<String>;

    /// Overwrite a single value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a key entirely.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// True when the key holds a non-empty value other than `"0"`.
    fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty() && v != "0")
    }
}

/// In-memory settings store, used by tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemorySettingsStore {
    values: BTreeMap<String, String>,
}

impl MemorySettingsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from key-value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn all(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// YAML-file-backed settings store.
///
/// Loads the whole map at construction and rewrites the file on every
/// mutation, mirroring the overwrite-per-key contract of the platform's
/// own settings table.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileSettingsStore {
    /// Load a store from a YAML mapping file. A missing file starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_yaml_ng::from_str(&content)?
        } else {
            debug!("Settings file {:?} missing, starting empty", path);
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    /// Path this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml_ng::to_string(&self.values)?;
        std::fs::write(&self.path, content)?;
        debug!("Saved {} settings to {:?}", self.values.len(), self.path);
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn all(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}
