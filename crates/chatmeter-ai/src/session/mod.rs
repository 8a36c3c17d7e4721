//! Chat session orchestration.
//!
//! A `ChatSession` owns the conversation history, the response cache, the
//! price table and the usage ledger, and routes calls to an [`AiClient`].
//!
//! Sessions are not synchronized: every operation takes `&mut self`, and
//! sharing one session between tasks requires an external lock.
//!
//! [`AiClient`]: crate::AiClient

mod chat;
mod manager;
mod types;

#[cfg(test)]
mod tests;

pub use manager::ChatSession;
pub use types::{CallOptions, EmbeddingBatch, Reply, SessionOptions, DEFAULT_SUMMARY_PROMPT};
