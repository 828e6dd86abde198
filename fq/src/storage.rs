//! Durable storage for the progress record
//!
//! The store only ever sees one named record as raw text. `FileStorage` keeps it
//! as `<dir>/<key>.json`; `MemoryStorage` keeps it in memory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors from the storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Read and overwrite a single named record
pub trait ProgressPort {
    /// Raw record content, or `None` if nothing was ever written
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Replace the record with `raw`
    fn write(&mut self, raw: &str) -> Result<(), StorageError>;
}

/// Record stored as a JSON file
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage for record `key` inside `dir`
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        let path = dir.as_ref().join(format!("{}.json", key));
        debug!(path = %path.display(), "FileStorage::new");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressPort for FileStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&mut self, raw: &str) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&self.path, raw).map_err(write_err)?;
        debug!(path = %self.path.display(), bytes = raw.len(), "FileStorage::write");
        Ok(())
    }
}

/// In-memory record, counting writes
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    record: Option<String>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `raw` already stored
    pub fn with_record(raw: impl Into<String>) -> Self {
        Self {
            record: Some(raw.into()),
            ..Self::default()
        }
    }

    /// Make every subsequent write fail
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn record(&self) -> Option<&str> {
        self.record.as_deref()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ProgressPort for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.record.clone())
    }

    fn write(&mut self, raw: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        self.record = Some(raw.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_missing_record() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path(), "progress");
        assert!(storage.read().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_overwrites() {
        let temp = TempDir::new().unwrap();
        let mut storage = FileStorage::new(temp.path().join("nested"), "progress");
        storage.write("first").unwrap();
        storage.write("second").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("second"));
        assert!(storage.path().ends_with("nested/progress.json"));
    }

    #[test]
    fn test_file_storage_read_error() {
        let temp = TempDir::new().unwrap();
        // a directory where the record should be
        fs::create_dir_all(temp.path().join("progress.json")).unwrap();
        let storage = FileStorage::new(temp.path(), "progress");
        assert!(matches!(storage.read(), Err(StorageError::Read { .. })));
    }

    #[test]
    fn test_memory_storage_counts_writes() {
        let mut storage = MemoryStorage::with_record("{}");
        assert_eq!(storage.read().unwrap().as_deref(), Some("{}"));
        storage.write("x").unwrap();
        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.record(), Some("x"));
    }

    #[test]
    fn test_memory_storage_failing_writes() {
        let mut storage = MemoryStorage::new().failing_writes();
        assert!(storage.write("x").is_err());
        assert_eq!(storage.writes(), 0);
        assert!(storage.record().is_none());
    }
}
