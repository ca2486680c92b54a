//! File-backed token store with atomic writes.
//!
//! Holds exactly one [`TokenRecord`] at the configured path. The cache is
//! best-effort: a failed write only costs a future re-acquisition, and an
//! unreadable file is treated as "no token".

use crate::cache::format::TokenRecord;
use crate::WorkbenchError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Token store at a single file path.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a store backed by `path`. Nothing is touched on disk yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `record`, logging instead of failing.
    pub fn save(&self, record: &TokenRecord) {
        match self.try_save(record) {
            Ok(()) => debug!(path = %self.path.display(), "Token cached"),
            Err(e) => warn!(path = %self.path.display(), "Could not cache token: {}", e),
        }
    }

    /// Load the cached record; `None` if absent or unparsable.
    pub fn load(&self) -> Option<TokenRecord> {
        match self.try_load() {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %self.path.display(), "Ignoring cached token: {}", e);
                None
            }
        }
    }

    /// Write the record via temp file + rename.
    pub fn try_save(&self, record: &TokenRecord) -> Result<(), WorkbenchError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                WorkbenchError::CacheIO(format!("Failed to create cache dir: {}", e))
            })?;
        }

        let json = record.to_json()?;
        let temp_path = self.temp_path();

        fs::write(&temp_path, &json)
            .map_err(|e| WorkbenchError::CacheIO(format!("Failed to write temp file: {}", e)))?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            WorkbenchError::CacheIO(format!("Failed to rename cache file: {}", e))
        })?;

        Ok(())
    }

    /// Read the record, distinguishing "absent" from "broken".
    pub fn try_load(&self) -> Result<Option<TokenRecord>, WorkbenchError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)
            .map_err(|e| WorkbenchError::CacheIO(format!("Failed to read cache file: {}", e)))?;

        TokenRecord::from_json(&json).map(Some)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
