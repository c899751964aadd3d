//! Persistence for the diary collection.
//!
//! The whole collection lives under a single key of a [`KeyValueStore`] as
//! one JSON array. Every write replaces the blob; nothing is incremental.

use crate::diary_entry::DiaryEntry;
use crate::error::{DiaryError, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub const STORAGE_KEY: &str = "diary_entries";

/// A key-value storage medium holding string values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let bytes = match fs::read(self.path_for(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        String::from_utf8(bytes).map(Some).map_err(|e| {
            warn!(key, error = %e, "stored value is not valid UTF-8");
            DiaryError::CorruptStorage(e.to_string())
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Dropping the temp file on any error below deletes it.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!(path = %path.display(), bytes = value.len(), "wrote storage file");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
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

/// Reads and writes the entry collection under [`STORAGE_KEY`].
pub struct DiaryStorage<S> {
    store: S,
}

impl<S: KeyValueStore> DiaryStorage<S> {
    pub fn new(store: S) -> Self {
        DiaryStorage { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn load(&self) -> Result<Vec<DiaryEntry>> {
        let Some(raw) = self.store.get(STORAGE_KEY)? else {
            return Ok(Vec::new());
        };
        let entries: Vec<DiaryEntry> = serde_json::from_str(&raw).map_err(|e| {
            warn!(error = %e, "stored diary could not be parsed");
            DiaryError::CorruptStorage(e.to_string())
        })?;

        let mut seen = HashSet::with_capacity(entries.len());
        if let Some(dup) = entries.iter().find(|e| !seen.insert(e.id.as_str())) {
            warn!(id = %dup.id, "stored diary contains a duplicate id");
            return Err(DiaryError::CorruptStorage(format!(
                "duplicate entry id {}",
                dup.id
            )));
        }

        Ok(entries)
    }

    pub fn save(&mut self, entries: &[DiaryEntry]) -> Result<()> {
        let serialized = serde_json::to_string(entries)?;
        self.store.set(STORAGE_KEY, &serialized)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(STORAGE_KEY)
    }
}
