//! chatmeter configuration system.
//!
//! TOML-based configuration for the API connection, default models,
//! conversation behaviour, response cache persistence and price overrides.
//! Every section has defaults so partial configs work out of the box.
//!
//! ```rust,no_run
//! let config = chatmeter_config::load_config().expect("failed to load config");
//! println!("{}", config.models.text);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

use std::path::Path;

pub use schema::{
    ApiConfig, CacheConfig, ChatmeterConfig, ModelsConfig, PricingRow, SessionConfig,
    API_KEY_ENV, CONFIG_SCHEMA_VERSION, DEFAULT_BASE_URL,
};

use chatmeter_common::ConfigError;

/// Load config from the platform default path and validate it.
///
/// Creates a commented default file if none exists.
pub fn load_config() -> Result<ChatmeterConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from an explicit path and validate it.
pub fn load_config_from(path: &Path) -> Result<ChatmeterConfig, ConfigError> {
    let config = toml_loader::load_from_path(path)?;
    validation::validate(&config)?;
    Ok(config)
}
