//! Async chat, estimate, and embedding methods for ChatSession.

use tracing::{debug, warn};

use crate::cache::{fingerprint, CacheEntry};
use crate::pricing::{estimate_tokens, Rates};
use crate::{AiError, ChatError, Message, Role};

use super::manager::ChatSession;
use super::types::{CallOptions, EmbeddingBatch, Reply, DEFAULT_SUMMARY_PROMPT};

impl ChatSession {
    /// Send a user message and return the assistant's reply with its price.
    ///
    /// Identical requests (same history, model and temperature) are answered
    /// from the cache without contacting the API. The call is one-shot, and
    /// leaves history untouched, when `options.temporary_interactive` is set
    /// or the session is not interactive. A failed or dropped call also
    /// leaves history untouched and caches nothing.
    ///
    /// In a non-interactive session history is cleared back to the system
    /// message before each call, so earlier turns (such as a summary) are
    /// never sent.
    pub async fn call(
        &mut self,
        message: impl Into<String>,
        options: CallOptions,
    ) -> Result<Reply, ChatError> {
        if !self.interactive {
            self.conversation.reset();
        }
        let persist = self.interactive && !options.temporary_interactive;
        self.exchange(message.into(), options.temperature, persist)
            .await
    }

    /// Ask the model to summarize, then keep only that question and answer.
    pub async fn summarize_and_clear_history(
        &mut self,
        prompt: Option<&str>,
    ) -> Result<Reply, ChatError> {
        let prompt = prompt.unwrap_or(DEFAULT_SUMMARY_PROMPT);
        let reply = self.exchange(prompt.to_string(), 0.0, true).await?;
        self.conversation.keep_last(2);
        Ok(reply)
    }

    /// Price estimate for sending `message` now, without sending it.
    ///
    /// Input counts the history that would be sent plus the message; output
    /// is guessed at 1.1x the message plus 20 tokens.
    pub fn estimate_price(&self, message: &str) -> Result<f64, ChatError> {
        let rates = self.prices.price_for(&self.text_model)?;
        let message_tokens = estimate_tokens(message) as f64;
        let history_tokens: usize = self
            .conversation
            .messages()
            .iter()
            .map(|m| estimate_tokens(&m.content))
            .sum();

        let input_tokens = history_tokens as f64 + message_tokens;
        let output_tokens = message_tokens * 1.1 + 20.0;
        Ok(rates.cost(input_tokens, output_tokens))
    }

    /// Embedding vector for `query`. Newlines are sent as spaces.
    pub async fn embedding(&mut self, query: &str) -> Result<Vec<f32>, ChatError> {
        let batch = self.embedding_batch(&[query]).await?;
        batch
            .vectors
            .into_iter()
            .next()
            .ok_or_else(|| AiError::ParseError("empty embedding response".to_string()).into())
    }

    /// Embed several queries in one request.
    pub async fn embedding_batch<S: AsRef<str>>(
        &mut self,
        queries: &[S],
    ) -> Result<EmbeddingBatch, ChatError> {
        let rates = self.prices.price_for(&self.embedding_model)?;
        if queries.is_empty() {
            return Ok(EmbeddingBatch::default());
        }

        let inputs: Vec<String> = queries
            .iter()
            .map(|q| q.as_ref().replace('\n', " "))
            .collect();
        let response = self
            .client
            .embed(&inputs, self.embedding_model.name())
            .await?;

        if response.vectors.len() != inputs.len() {
            return Err(AiError::ParseError(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                response.vectors.len()
            ))
            .into());
        }

        let price = rates.cost_of(&response.usage);
        self.ledger
            .record(self.embedding_model.name(), &response.usage, price);

        Ok(EmbeddingBatch {
            vectors: response.vectors,
            price,
        })
    }

    /// Answer `message` on top of the current history.
    ///
    /// History is only written after a reply is in hand, and only when
    /// `persist` is set, so an error or a dropped future leaves it unchanged.
    async fn exchange(
        &mut self,
        message: String,
        temperature: f64,
        persist: bool,
    ) -> Result<Reply, ChatError> {
        let rates = self.prices.price_for(&self.text_model)?;

        let mut outgoing = self.conversation.messages().to_vec();
        outgoing.push(Message::new(Role::User, message.clone()));
        let key = fingerprint(&outgoing, self.text_model.name(), temperature);

        let reply = match self.cache.get(&key).cloned() {
            Some(entry) => {
                let price = rates.cost(entry.input_tokens as f64, entry.output_tokens as f64);
                debug!(fingerprint = %&key[..12], price, "cache hit");
                self.ledger.record_cache_hit(price);
                Reply {
                    content: entry.response,
                    price,
                    cached: true,
                }
            }
            None => self.fetch(&outgoing, key, rates, temperature).await?,
        };

        if persist {
            self.conversation.append(Role::User, message);
            self.conversation
                .append(Role::Assistant, reply.content.clone());
        }
        Ok(reply)
    }

    /// Ask the API, then record spend and cache the answer under `key`.
    async fn fetch(
        &mut self,
        outgoing: &[Message],
        key: String,
        rates: Rates,
        temperature: f64,
    ) -> Result<Reply, ChatError> {
        debug!(fingerprint = %&key[..12], model = %self.text_model, "cache miss");

        let response = self
            .client
            .send_message(outgoing, self.text_model.name(), temperature)
            .await?;

        let price = rates.cost_of(&response.usage);
        self.ledger
            .record(self.text_model.name(), &response.usage, price);
        self.cache.put(CacheEntry {
            fingerprint: key,
            response: response.content.clone(),
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        });

        if self.auto_save {
            // Save failures are logged, never returned.
            if let Err(e) = self.save_cache() {
                warn!("failed to save response cache: {e}");
            }
        }

        Ok(Reply {
            content: response.content,
            price,
            cached: false,
        })
    }
}
