//! Persistence of the tuned-config document.
//!
//! The analyzer is the only writer; the observer reads on every
//! `/api/config` request. [`JsonFileStore`] replaces the file atomically
//! (temp file in the same directory, then rename) so a reader never sees
//! a half-written document. The `{}` created when a read finds no file is
//! linked in without replacement, so it cannot land over a tuned document
//! written in the meantime. [`MemoryStore`] backs tests.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};
use wave_types::ConfigDocument;

/// Errors from reading or writing the tuned-config document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("config store I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// The file holds invalid JSON.
    #[error("config store JSON error: {source}")]
    Json {
        /// The underlying parse error.
        #[from]
        source: serde_json::Error,
    },

    /// The file holds valid JSON that is not an object.
    #[error("config document at {path} is not a JSON object")]
    NotAnObject {
        /// Offending file.
        path: PathBuf,
    },

    /// The in-memory lock was poisoned.
    #[error("config store lock poisoned: {message}")]
    Lock {
        /// Poison error description.
        message: String,
    },
}

/// Read and replace the tuned-config document.
pub trait ConfigStore: Send + Sync {
    /// Read the current document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage cannot be read or
    /// does not hold a JSON object.
    fn read(&self) -> Result<ConfigDocument, StoreError>;

    /// Replace the whole document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the document cannot be persisted.
    fn write(&self, doc: &ConfigDocument) -> Result<(), StoreError>;
}

/// Store backed by a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for `path`. Nothing is touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> io::Result<PathBuf> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;
        Ok(parent)
    }

    fn stage(&self, doc: &ConfigDocument) -> Result<tempfile::NamedTempFile, StoreError> {
        let parent = self.ensure_parent()?;
        let body = serde_json::to_vec_pretty(doc)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        Ok(tmp)
    }

    /// Create the file holding `{}`. Returns `false` if a writer created
    /// the file first; an existing document is never replaced.
    fn bootstrap(&self) -> Result<bool, StoreError> {
        let tmp = self.stage(&ConfigDocument::new())?;
        match tmp.persist_noclobber(&self.path) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.error.into()),
        }
    }
}

impl ConfigStore for JsonFileStore {
    fn read(&self) -> Result<ConfigDocument, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.bootstrap()? {
                    info!(
                        path = %self.path.display(),
                        "Tuned config missing, bootstrapped empty document"
                    );
                    return Ok(ConfigDocument::new());
                }
                fs::read_to_string(&self.path)?
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&text)? {
            serde_json::Value::Object(doc) => Ok(doc),
            _ => Err(StoreError::NotAnObject {
                path: self.path.clone(),
            }),
        }
    }

    fn write(&self, doc: &ConfigDocument) -> Result<(), StoreError> {
        self.stage(doc)?.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), keys = doc.len(), "Tuned config written");
        Ok(())
    }
}

/// Store holding the document in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    doc: ConfigDocument,
    writes: usize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with `doc`.
    pub const fn with_document(doc: ConfigDocument) -> Self {
        Self {
            inner: Mutex::new(MemoryInner { doc, writes: 0 }),
        }
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.writes)
    }
}

impl ConfigStore for MemoryStore {
    fn read(&self) -> Result<ConfigDocument, StoreError> {
        let inner = self.inner.lock().map_err(|e| StoreError::Lock {
            message: e.to_string(),
        })?;
        Ok(inner.doc.clone())
    }

    fn write(&self, doc: &ConfigDocument) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().map_err(|e| StoreError::Lock {
            message: e.to_string(),
        })?;
        inner.doc = doc.clone();
        inner.writes = inner.writes.saturating_add(1);
        Ok(())
    }
}
