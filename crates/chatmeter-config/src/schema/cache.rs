//! Response cache persistence.

use std::path::PathBuf;

use chatmeter_common::ConfigError;
use serde::{Deserialize, Serialize};

use crate::toml_loader::default_cache_path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache file. Defaults to `<data_dir>/chatmeter/cache.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Merge the cache file into memory when a session is created.
    pub auto_load: bool,
    /// Write the cache file after every call that adds an entry.
    pub auto_save: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: None,
            auto_load: true,
            auto_save: true,
        }
    }
}

impl CacheConfig {
    /// The configured path, or the platform default.
    pub fn resolved_path(&self) -> Result<PathBuf, ConfigError> {
        match self.path {
            Some(ref path) => Ok(path.clone()),
            None => default_cache_path(),
        }
    }
}
