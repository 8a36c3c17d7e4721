//! In-memory cache map with JSON file persistence.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ChatError;

/// On-disk format version. Files with any other version are rejected.
pub const CACHE_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub response: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Serialize)]
struct CacheFileRef<'a> {
    version: u32,
    entries: &'a BTreeMap<String, CacheEntry>,
}

#[derive(Deserialize)]
struct CacheFile {
    version: u32,
    entries: BTreeMap<String, CacheEntry>,
}

/// Fingerprint to response map. Writes overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &str) -> Option<&CacheEntry> {
        self.entries.get(fingerprint)
    }

    pub fn put(&mut self, entry: CacheEntry) {
        self.entries.insert(entry.fingerprint.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Merge entries from a cache file, returning how many were read.
    ///
    /// A missing file reads as empty. File entries replace in-memory entries
    /// with the same fingerprint. On error nothing is merged.
    pub fn load(&mut self, path: &Path) -> Result<usize, ChatError> {
        let corrupt = |reason: String| ChatError::CorruptCache {
            path: path.to_path_buf(),
            reason,
        };

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no cache file at {}, starting empty", path.display());
                return Ok(0);
            }
            Err(e) => return Err(corrupt(format!("failed to read: {e}"))),
        };

        let file: CacheFile = serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()))?;
        if file.version != CACHE_FILE_VERSION {
            return Err(corrupt(format!(
                "unsupported cache version {} (expected {CACHE_FILE_VERSION})",
                file.version
            )));
        }
        if let Some((key, _)) = file.entries.iter().find(|(k, e)| **k != e.fingerprint) {
            return Err(corrupt(format!(
                "entry under key {key} has a different fingerprint"
            )));
        }

        let count = file.entries.len();
        self.entries.extend(file.entries);
        info!(entries = count, "loaded response cache from {}", path.display());
        Ok(count)
    }

    /// Write the cache as JSON.
    ///
    /// Writes `<path>.tmp` then renames it over `path`, so a crash mid-write
    /// leaves the previous file intact. If the rename fails the file is
    /// written directly; a failure during that direct write can leave a
    /// truncated file, which a later [`load`](Self::load) reports as corrupt.
    pub fn save(&self, path: &Path) -> Result<(), ChatError> {
        let write_err = |source: std::io::Error| ChatError::CacheWrite {
            path: path.to_path_buf(),
            source,
        };

        let json = serde_json::to_string_pretty(&CacheFileRef {
            version: CACHE_FILE_VERSION,
            entries: &self.entries,
        })
        .map_err(|e| write_err(std::io::Error::other(e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json).map_err(write_err)?;

        if let Err(e) = std::fs::rename(&tmp_path, path) {
            warn!("atomic rename failed ({e}), falling back to direct write");
            std::fs::write(path, &json).map_err(write_err)?;
            let _ = std::fs::remove_file(&tmp_path);
        }

        debug!(entries = self.entries.len(), "saved response cache to {}", path.display());
        Ok(())
    }
}
