//! AiClient trait implementation for OpenAiClient.

use async_trait::async_trait;
use tracing::debug;

use crate::{AiClient, AiError, AiResponse, EmbeddingResponse, Message};

use super::client::OpenAiClient;

impl OpenAiClient {
    /// POST a JSON body and return the decoded JSON response.
    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, AiError> {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.config.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
        }

        response
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl AiClient for OpenAiClient {
    async fn send_message(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f64,
    ) -> Result<AiResponse, AiError> {
        let body = self.build_chat_body(messages, model, temperature);

        debug!(model, messages = messages.len(), temperature, "OpenAI chat request");

        let json = self.post_json("chat/completions", &body).await?;
        self.parse_chat_response(json)
    }

    async fn embed(&self, inputs: &[String], model: &str) -> Result<EmbeddingResponse, AiError> {
        let body = self.build_embedding_body(inputs, model);

        debug!(model, inputs = inputs.len(), "OpenAI embedding request");

        let json = self.post_json("embeddings", &body).await?;
        self.parse_embedding_response(json)
    }
}
