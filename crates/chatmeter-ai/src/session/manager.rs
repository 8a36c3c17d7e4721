//! ChatSession struct, construction, and state accessors.

use std::path::{Path, PathBuf};

use chatmeter_common::ConfigError;
use chatmeter_config::{validation, ChatmeterConfig};
use tracing::{debug, info};

use crate::cache::ResponseCache;
use crate::conversation::Conversation;
use crate::ledger::UsageLedger;
use crate::openai::{OpenAiClient, OpenAiConfig};
use crate::pricing::{PriceRow, PriceTable};
use crate::{AiClient, ChatError, Model};

use super::types::SessionOptions;

/// A conversation with a remote model, backed by a response cache.
pub struct ChatSession {
    pub(super) client: Box<dyn AiClient>,
    pub(super) text_model: Model,
    pub(super) embedding_model: Model,
    /// Default persistence mode for calls.
    pub(super) interactive: bool,
    pub(super) conversation: Conversation,
    pub(super) cache: ResponseCache,
    pub(super) cache_path: Option<PathBuf>,
    pub(super) auto_save: bool,
    pub(super) prices: PriceTable,
    pub(super) ledger: UsageLedger,
}

impl ChatSession {
    /// Build a session around `client`.
    ///
    /// With a cache path and `auto_load`, the cache file is merged in now; a
    /// corrupt file fails construction with [`ChatError::CorruptCache`].
    /// Price overrides must have finite, non-negative rates.
    pub fn new(client: Box<dyn AiClient>, options: SessionOptions) -> Result<Self, ChatError> {
        validate_price_rows(&options.price_overrides)?;

        let mut cache = ResponseCache::new();
        if let (Some(path), true) = (options.cache_path.as_deref(), options.auto_load) {
            cache.load(path)?;
        }

        info!(
            model = %options.text_model,
            embedding_model = %options.embedding_model,
            interactive = options.interactive,
            cached = cache.len(),
            "chat session ready"
        );

        Ok(Self {
            client,
            text_model: Model::text(options.text_model),
            embedding_model: Model::embedding(options.embedding_model),
            interactive: options.interactive,
            conversation: Conversation::new(options.system_prompt),
            cache,
            cache_path: options.cache_path,
            auto_save: options.auto_save,
            prices: PriceTable::builtin().with_rows(options.price_overrides),
            ledger: UsageLedger::new(),
        })
    }

    /// Build a session talking to the OpenAI API described by `config`.
    ///
    /// The config is validated first, so configs read with the lenient
    /// [`chatmeter_config::toml_loader::load_from_path`] are checked too.
    pub fn from_config(config: &ChatmeterConfig) -> Result<Self, ChatError> {
        validation::validate(config)?;
        let client = OpenAiClient::new(OpenAiConfig::from_api_config(&config.api)?)?;
        let options = SessionOptions::from_config(config)?;
        Self::new(Box::new(client), options)
    }

    /// Clear conversation history back to the initial system message.
    pub fn reset(&mut self) {
        self.conversation.reset();
    }

    /// Transcript of the conversation so far.
    pub fn to_str(&self) -> String {
        self.conversation.render()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn text_model(&self) -> &Model {
        &self.text_model
    }

    pub fn embedding_model(&self) -> &Model {
        &self.embedding_model
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Write the cache to the configured path. No-op for in-memory sessions.
    pub fn save_cache(&self) -> Result<(), ChatError> {
        match self.cache_path {
            Some(ref path) => self.cache.save(path),
            None => {
                debug!("no cache path configured, skipping save");
                Ok(())
            }
        }
    }

    /// Merge another cache file into this session's cache.
    pub fn load_cache(&mut self, path: &Path) -> Result<usize, ChatError> {
        self.cache.load(path)
    }
}

fn validate_price_rows(rows: &[PriceRow]) -> Result<(), ConfigError> {
    let errors: Vec<String> = rows
        .iter()
        .flat_map(|row| {
            [
                ("input_per_1k", row.rates.input_per_1k),
                ("output_per_1k", row.rates.output_per_1k),
            ]
            .into_iter()
            .filter(|(_, rate)| !rate.is_finite() || *rate < 0.0)
            .map(move |(field, rate)| {
                format!(
                    "price override {}.{field} = {rate} must be a finite, non-negative rate",
                    row.model_name
                )
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
