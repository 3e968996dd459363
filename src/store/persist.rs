//! Durable mirror of the working documents.
//!
//! Keys are plain strings; values are JSON text. The working copy is only
//! trusted when the stored [`VERSION_KEY`] matches the bundle version of the
//! canonical documents the store was built with.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::documents::Documents;

/// Key holding the bundle version of the persisted documents.
pub const VERSION_KEY: &str = "bundle-version";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access persisted key '{key}' at {path}: {source}")]
    Io {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("persisted key '{key}' is not a valid document: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("persisted key '{0}' is not a usable file name")]
    InvalidKey(String),
}

/// A keyed string store.
pub trait PersistStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
}

/// In-memory persistence. Clones share the same entries, so a test can keep
/// a handle while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

impl PersistStore for MemoryPersistence {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.get(key))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.insert(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Directory-backed persistence, one `<key>.json` file per key.
///
/// The directory is created on first save.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    dir: PathBuf,
}

impl FilePersistence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, PersistError> {
        let usable = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !usable {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl PersistStore for FilePersistence {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.key_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistError::Io {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.key_path(key)?;
        let io_err = |source: std::io::Error| PersistError::Io {
            key: key.to_string(),
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        std::fs::write(&path, value).map_err(io_err)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        let path = self.key_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistError::Io {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }
}

/// SHA-256 hex digest over the three documents in domain order.
pub fn bundle_version(documents: &Documents) -> String {
    let mut hasher = Sha256::new();
    for (domain, document) in documents.iter() {
        hasher.update(domain.key().as_bytes());
        hasher.update([0u8]);
        hasher.update(document.to_string().as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}
