//! OpenAI client struct, request building, and response parsing.

use tracing::warn;

use crate::{AiError, AiResponse, EmbeddingResponse, Message, TokenUsage};

use super::config::OpenAiConfig;

/// OpenAI API client.
pub struct OpenAiClient {
    pub(crate) config: OpenAiConfig,
    pub(crate) http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Build the JSON request body for the Chat Completions API.
    pub(crate) fn build_chat_body(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f64,
    ) -> serde_json::Value {
        let msgs: Vec<_> = messages
            .iter()
            .map(|msg| {
                serde_json::json!({
                    "role": msg.role.as_str(),
                    "content": msg.content,
                })
            })
            .collect();

        serde_json::json!({
            "model": model,
            "messages": msgs,
            "temperature": temperature,
        })
    }

    /// Parse a Chat Completions response.
    pub(crate) fn parse_chat_response(&self, json: serde_json::Value) -> Result<AiResponse, AiError> {
        let content = json["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice["message"]["content"].as_str())
            .map(String::from)
            .ok_or_else(|| AiError::ParseError("no message content in response".to_string()))?;

        if json["usage"].is_null() {
            warn!("No usage data in chat completion response");
        }

        let usage = TokenUsage {
            input_tokens: json["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
            output_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0),
        };

        Ok(AiResponse { content, usage })
    }

    pub(crate) fn build_embedding_body(&self, inputs: &[String], model: &str) -> serde_json::Value {
        serde_json::json!({
            "model": model,
            "input": inputs,
        })
    }

    /// Parse an Embeddings response, ordering vectors by their `index`.
    pub(crate) fn parse_embedding_response(
        &self,
        json: serde_json::Value,
    ) -> Result<EmbeddingResponse, AiError> {
        let data = json["data"]
            .as_array()
            .ok_or_else(|| AiError::ParseError("no data in embedding response".to_string()))?;

        let mut indexed = Vec::with_capacity(data.len());
        for (position, item) in data.iter().enumerate() {
            let index = item["index"].as_u64().map_or(position, |i| i as usize);
            let vector = item["embedding"]
                .as_array()
                .ok_or_else(|| {
                    AiError::ParseError(format!("embedding {index} is not an array"))
                })?
                .iter()
                .map(|v| {
                    v.as_f64().map(|f| f as f32).ok_or_else(|| {
                        AiError::ParseError(format!("embedding {index} has a non-numeric value"))
                    })
                })
                .collect::<Result<Vec<f32>, AiError>>()?;
            indexed.push((index, vector));
        }
        indexed.sort_by_key(|(index, _)| *index);
        if let Some(position) = indexed
            .iter()
            .enumerate()
            .position(|(position, (index, _))| position != *index)
        {
            return Err(AiError::ParseError(format!(
                "embedding indices are not 0..{}: index {position} is missing or repeated",
                indexed.len()
            )));
        }

        let usage = TokenUsage {
            input_tokens: json["usage"]["total_tokens"]
                .as_u64()
                .or_else(|| json["usage"]["prompt_tokens"].as_u64())
                .unwrap_or(0),
            output_tokens: 0,
        };

        Ok(EmbeddingResponse {
            vectors: indexed.into_iter().map(|(_, vector)| vector).collect(),
            usage,
        })
    }
}
