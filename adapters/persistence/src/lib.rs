#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Storage backends for persisted matches.
//!
//! Stores deal in opaque text payloads. Encoding and decoding the match is the
//! controller's concern.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;
use thiserror::Error;

/// Errors raised by a [`Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The saved payload could not be read.
    #[error("failed to read saved match from {path}")]
    Read {
        /// Location of the payload.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The payload could not be written.
    #[error("failed to write saved match to {path}")]
    Write {
        /// Location of the payload.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The saved payload could not be removed.
    #[error("failed to clear saved match at {path}")]
    Clear {
        /// Location of the payload.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The backend refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence collaborator holding at most one saved match.
pub trait Store {
    /// Returns the saved payload, or `None` when nothing was saved.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replaces the saved payload.
    fn save(&mut self, payload: &str) -> Result<(), StoreError>;

    /// Forgets the saved payload.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Store keeping the payload in a single file.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by the file at `path`. The file need not exist.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }
}

impl Store for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                debug!("[Store] no saved match at {}", self.path.display());
                Ok(None)
            }
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&mut self, payload: &str) -> Result<(), StoreError> {
        let write_error = |source: io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let staging = self.staging_path();
        fs::write(&staging, payload).map_err(write_error)?;
        fs::rename(&staging, &self.path).map_err(write_error)?;
        debug!("[Store] saved {} bytes to {}", payload.len(), self.path.display());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Clear {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// In-memory store with optional fault injection.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    payload: Option<String>,
    fail_loads: bool,
    fail_saves: bool,
    fail_clears: bool,
    saves: usize,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding a payload.
    #[must_use]
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
            ..Self::default()
        }
    }

    /// Makes every load fail.
    #[must_use]
    pub fn failing_loads(mut self) -> Self {
        self.fail_loads = true;
        self
    }

    /// Makes every save fail.
    #[must_use]
    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    /// Makes every clear fail.
    #[must_use]
    pub fn failing_clears(mut self) -> Self {
        self.fail_clears = true;
        self
    }

    /// Current payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Number of successful saves.
    #[must_use]
    pub const fn saves(&self) -> usize {
        self.saves
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        if self.fail_loads {
            return Err(StoreError::Unavailable("load refused".to_owned()));
        }
        Ok(self.payload.clone())
    }

    fn save(&mut self, payload: &str) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Unavailable("save refused".to_owned()));
        }
        self.payload = Some(payload.to_owned());
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        if self.fail_clears {
            return Err(StoreError::Unavailable("clear refused".to_owned()));
        }
        self.payload = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_payload() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().expect("load"), None);
        store.save("{}").expect("save");
        assert_eq!(store.load().expect("load").as_deref(), Some("{}"));
        assert_eq!(store.saves(), 1);
        store.clear().expect("clear");
        assert_eq!(store.payload(), None);
    }

    #[test]
    fn memory_store_injects_faults() {
        let mut store = MemoryStore::with_payload("{}")
            .failing_loads()
            .failing_saves()
            .failing_clears();
        assert!(matches!(store.load(), Err(StoreError::Unavailable(_))));
        assert!(store.save("x").is_err());
        assert!(store.clear().is_err());
        assert_eq!(store.payload(), Some("{}"));
        assert_eq!(store.saves(), 0);
    }
}
