//! OpenAI API client.
//!
//! Implements the `AiClient` trait against the Chat Completions
//! (`/chat/completions`) and Embeddings (`/embeddings`) endpoints of any
//! OpenAI-compatible server.

mod api;
mod client;
mod config;

pub use client::OpenAiClient;
pub use config::OpenAiConfig;
