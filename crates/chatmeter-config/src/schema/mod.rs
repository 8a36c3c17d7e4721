//! Configuration schema types for chatmeter.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults documented on each field.

mod api;
mod cache;
mod models;
mod pricing;
mod session;

pub use api::*;
pub use cache::*;
pub use models::*;
pub use pricing::*;
pub use session::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatmeterConfig {
    /// Schema the file was written for. Must equal [`CONFIG_SCHEMA_VERSION`].
    pub schema_version: u32,
    pub api: ApiConfig,
    pub models: ModelsConfig,
    pub session: SessionConfig,
    pub cache: CacheConfig,
    /// Price overrides, merged over the built-in table by model name.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pricing: Vec<PricingRow>,
}

impl Default for ChatmeterConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            api: ApiConfig::default(),
            models: ModelsConfig::default(),
            session: SessionConfig::default(),
            cache: CacheConfig::default(),
            pricing: Vec::new(),
        }
    }
}
