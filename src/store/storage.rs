//! Durable backends for the settings record

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

use crate::config::record_file_name;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed settings record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Storage is read-only")]
    ReadOnly,

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Versioned envelope written to durable storage.
///
/// `state` is kept untyped so records from other schema versions can be
/// inspected before they are trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub state: Value,
    pub version: u32,
}

/// Trait for durable storage backends
pub trait SettingsStorage {
    /// Read the stored record, `Ok(None)` when nothing has been written yet
    fn read(&self) -> Result<Option<PersistedRecord>, StorageError>;

    /// Replace the stored record
    fn write(&self, record: &PersistedRecord) -> Result<(), StorageError>;

    /// Where the record lives, for logs and the CLI
    fn location(&self) -> String;
}

/// JSON file backend
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Store the record as `<dir>/interview-coder-settings.json`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(record_file_name()),
        }
    }

    /// Store the record at an explicit file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsStorage for FileStorage {
    fn read(&self) -> Result<Option<PersistedRecord>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let record = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    fn write(&self, record: &PersistedRecord) -> Result<(), StorageError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(|e| self.io_error(e))?;

        // Write to a sibling temp file and rename so readers never see a torn record
        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| self.io_error(e))?;
        serde_json::to_writer_pretty(&mut tmp, record)?;
        tmp.write_all(b"\n").map_err(|e| self.io_error(e))?;
        tmp.flush().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        tracing::debug!("Wrote settings record to {}", self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory backend. Clones share the same record, which lets tests
/// simulate a restart by opening a second store over a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    record: Arc<RwLock<Option<PersistedRecord>>>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a record
    pub fn with_record(record: PersistedRecord) -> Self {
        Self {
            record: Arc::new(RwLock::new(Some(record))),
            read_only: false,
        }
    }

    /// Storage whose writes always fail
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Current stored record
    pub fn snapshot(&self) -> Option<PersistedRecord> {
        self.record.read().ok().and_then(|guard| guard.clone())
    }

    /// Poison the shared lock by panicking while holding it
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let record = Arc::clone(&self.record);
        let _ = std::thread::spawn(move || {
            let _guard = record.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
    }
}

impl SettingsStorage for MemoryStorage {
    fn read(&self) -> Result<Option<PersistedRecord>, StorageError> {
        let guard = self.record.read().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.clone())
    }

    fn write(&self, record: &PersistedRecord) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        let mut guard = self.record.write().map_err(|_| StorageError::Poisoned)?;
        *guard = Some(record.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
