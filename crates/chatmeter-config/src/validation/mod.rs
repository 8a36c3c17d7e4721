//! Full configuration validation.
//!
//! Each section has its own check; this orchestrator calls them all and
//! collects errors into a single `ConfigError`.

mod helpers;


use chatmeter_common::ConfigError;

use crate::schema::{ChatmeterConfig, CONFIG_SCHEMA_VERSION};

use helpers::{validate_non_empty, validate_range, validate_rate};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ChatmeterConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    if config.schema_version != CONFIG_SCHEMA_VERSION {
        errors.push(format!(
            "schema_version = {} is not supported (expected {CONFIG_SCHEMA_VERSION})",
            config.schema_version
        ));
    }
    validate_api(&mut errors, config);
    validate_models(&mut errors, config);
    validate_pricing(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_api(errors: &mut Vec<String>, config: &ChatmeterConfig) {
    let api = &config.api;
    if !(api.base_url.starts_with("http://") || api.base_url.starts_with("https://")) {
        errors.push(format!(
            "api.base_url = {:?} must start with http:// or https://",
            api.base_url
        ));
    }
    validate_range(
        errors,
        "api.connect_timeout_secs",
        api.connect_timeout_secs,
        1,
        600,
    );
    validate_range(
        errors,
        "api.request_timeout_secs",
        api.request_timeout_secs,
        1,
        600,
    );
}

fn validate_models(errors: &mut Vec<String>, config: &ChatmeterConfig) {
    validate_non_empty(errors, "models.text", &config.models.text);
    validate_non_empty(errors, "models.embedding", &config.models.embedding);
}

fn validate_pricing(errors: &mut Vec<String>, config: &ChatmeterConfig) {
    for (i, row) in config.pricing.iter().enumerate() {
        validate_non_empty(errors, &format!("pricing[{i}].model"), &row.model);
        validate_rate(errors, &format!("pricing[{i}].input_per_1k"), row.input_per_1k);
        validate_rate(errors, &format!("pricing[{i}].output_per_1k"), row.output_per_1k);
    }
}
