//! Session construction options and call results.

use std::path::PathBuf;

use chatmeter_common::ConfigError;
use chatmeter_config::ChatmeterConfig;

use crate::PriceRow;

pub const DEFAULT_SUMMARY_PROMPT: &str = "Summarize the conversation so far.";

/// Everything a [`ChatSession`](super::ChatSession) needs besides its client.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub text_model: String,
    pub embedding_model: String,
    /// Default persistence mode. When false every call is one-shot.
    pub interactive: bool,
    pub system_prompt: Option<String>,
    /// Cache file. `None` keeps the cache in memory only.
    pub cache_path: Option<PathBuf>,
    pub auto_load: bool,
    pub auto_save: bool,
    /// Rows layered over the built-in price table.
    pub price_overrides: Vec<PriceRow>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            text_model: "gpt-3.5-turbo".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            interactive: true,
            system_prompt: None,
            cache_path: None,
            auto_load: true,
            auto_save: true,
            price_overrides: Vec::new(),
        }
    }
}

impl SessionOptions {
    pub fn new(text_model: impl Into<String>) -> Self {
        Self {
            text_model: text_model.into(),
            ..Self::default()
        }
    }

    pub fn from_config(config: &ChatmeterConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            text_model: config.models.text.clone(),
            embedding_model: config.models.embedding.clone(),
            interactive: config.session.interactive,
            system_prompt: config.session.system_prompt.clone(),
            cache_path: Some(config.cache.resolved_path()?),
            auto_load: config.cache.auto_load,
            auto_save: config.cache.auto_save,
            price_overrides: config.pricing.iter().map(PriceRow::from).collect(),
        })
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn with_auto_load(mut self, auto_load: bool) -> Self {
        self.auto_load = auto_load;
        self
    }

    pub fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    pub fn with_price(mut self, row: PriceRow) -> Self {
        self.price_overrides.push(row);
        self
    }
}

/// Per-call parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallOptions {
    pub temperature: f64,
    /// Discard this call's turns from history once it returns.
    pub temporary_interactive: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            temporary_interactive: false,
        }
    }
}

impl CallOptions {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn one_shot(mut self) -> Self {
        self.temporary_interactive = true;
        self
    }
}

/// Result of a chat call.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub content: String,
    /// USD. For cache hits, what the original call cost.
    pub price: f64,
    pub cached: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingBatch {
    /// One vector per input, in input order.
    pub vectors: Vec<Vec<f32>>,
    pub price: f64,
}
