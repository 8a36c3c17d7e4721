//! AI engine for chatmeter.
//!
//! Wraps an OpenAI-compatible text-generation and embedding API with:
//! - Conversation history with interactive and one-shot calls
//! - A persistent response cache keyed by conversation fingerprint
//! - Per-model pricing and cumulative spend tracking

pub mod cache;
pub mod conversation;
pub mod error;
pub mod ledger;
pub mod model;
pub mod openai;
pub mod pricing;
pub mod session;

use async_trait::async_trait;

pub use cache::{fingerprint, CacheEntry, ResponseCache};
pub use conversation::Conversation;
pub use error::ChatError;
pub use ledger::UsageLedger;
pub use model::Model;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use pricing::{PriceRow, PriceTable, Rates};
pub use session::{CallOptions, ChatSession, EmbeddingBatch, Reply, SessionOptions};

/// Remote model backend: chat completions and embeddings.
#[async_trait]
pub trait AiClient: Send + Sync {
    async fn send_message(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f64,
    ) -> Result<AiResponse, AiError>;

    /// Embed every input in one request; vectors come back in input order.
    async fn embed(&self, inputs: &[String], model: &str) -> Result<EmbeddingResponse, AiError>;
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiResponse {
    pub content: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default)]
pub struct EmbeddingResponse {
    pub vectors: Vec<Vec<f32>>,
    /// Embedding endpoints only bill input tokens; `output_tokens` stays 0.
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
}
