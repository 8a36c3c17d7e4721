//! Session tests against an in-memory client.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chatmeter_common::{ConfigError, ModelKind};

use super::*;
use crate::{
    AiClient, AiError, AiResponse, ChatError, EmbeddingResponse, Message, PriceRow, Role,
    TokenUsage,
};

#[derive(Default)]
struct MockState {
    chat_calls: AtomicUsize,
    embed_calls: AtomicUsize,
    fail: AtomicBool,
    last_messages: Mutex<Vec<Message>>,
    last_inputs: Mutex<Vec<String>>,
}

/// Replies `echo: <last message>` at 1000 input / 500 output tokens.
#[derive(Clone, Default)]
struct MockClient {
    state: Arc<MockState>,
}

impl MockClient {
    fn chat_calls(&self) -> usize {
        self.state.chat_calls.load(Ordering::SeqCst)
    }

    fn embed_calls(&self) -> usize {
        self.state.embed_calls.load(Ordering::SeqCst)
    }

    fn set_failing(&self, fail: bool) {
        self.state.fail.store(fail, Ordering::SeqCst);
    }

    fn last_messages(&self) -> Vec<Message> {
        self.state.last_messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiClient for MockClient {
    async fn send_message(
        &self,
        messages: &[Message],
        _model: &str,
        _temperature: f64,
    ) -> Result<AiResponse, AiError> {
        self.state.chat_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail.load(Ordering::SeqCst) {
            return Err(AiError::RateLimited);
        }
        *self.state.last_messages.lock().unwrap() = messages.to_vec();

        let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        Ok(AiResponse {
            content: format!("echo: {last}"),
            usage: TokenUsage {
                input_tokens: 1000,
                output_tokens: 500,
            },
        })
    }

    async fn embed(&self, inputs: &[String], _model: &str) -> Result<EmbeddingResponse, AiError> {
        self.state.embed_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail.load(Ordering::SeqCst) {
            return Err(AiError::NetworkError("connection reset".into()));
        }
        *self.state.last_inputs.lock().unwrap() = inputs.to_vec();

        Ok(EmbeddingResponse {
            vectors: inputs
                .iter()
                .map(|input| vec![input.len() as f32, 1.0])
                .collect(),
            usage: TokenUsage {
                input_tokens: 8 * inputs.len() as u64,
                output_tokens: 0,
            },
        })
    }
}

/// Never answers in time.
struct StalledClient;

#[async_trait]
impl AiClient for StalledClient {
    async fn send_message(
        &self,
        _messages: &[Message],
        _model: &str,
        _temperature: f64,
    ) -> Result<AiResponse, AiError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Err(AiError::Timeout)
    }

    async fn embed(&self, _inputs: &[String], _model: &str) -> Result<EmbeddingResponse, AiError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Err(AiError::Timeout)
    }
}

fn session_with(options: SessionOptions) -> (ChatSession, MockClient) {
    let mock = MockClient::default();
    let session = ChatSession::new(Box::new(mock.clone()), options).unwrap();
    (session, mock)
}

fn session() -> (ChatSession, MockClient) {
    session_with(SessionOptions::default())
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

#[tokio::test]
async fn call_appends_user_and_assistant_turns() {
    let (mut session, mock) = session();

    let reply = session.call("hi", CallOptions::default()).await.unwrap();

    assert_eq!(reply.content, "echo: hi");
    assert!(!reply.cached);
    assert!(approx_eq(reply.price, 0.0025), "got {}", reply.price);
    assert_eq!(mock.chat_calls(), 1);
    assert_eq!(session.to_str(), "> user: \nhi\n\n> assistant: \necho: hi");
}

#[tokio::test]
async fn interactive_calls_send_full_history() {
    let (mut session, mock) = session_with(SessionOptions::default().with_system_prompt("sys"));

    session.call("one", CallOptions::default()).await.unwrap();
    session.call("two", CallOptions::default()).await.unwrap();

    let roles: Vec<_> = mock.last_messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        [Role::System, Role::User, Role::Assistant, Role::User]
    );
    assert_eq!(session.conversation().len(), 5);
}

#[tokio::test]
async fn identical_history_is_served_from_cache() {
    let (mut session, mock) = session();

    let first = session.call("hi", CallOptions::default()).await.unwrap();
    session.reset();
    let second = session.call("hi", CallOptions::default()).await.unwrap();

    assert_eq!(mock.chat_calls(), 1);
    assert!(second.cached);
    assert_eq!(second.content, first.content);
    // Hits report the price recomputed from the stored token counts.
    assert!(approx_eq(second.price, first.price));
    assert_eq!(session.to_str(), "> user: \nhi\n\n> assistant: \necho: hi");

    let ledger = session.ledger();
    assert_eq!(ledger.call_count(), 1);
    assert_eq!(ledger.cache_hits(), 1);
    assert!(approx_eq(ledger.total_cost(), first.price));
    assert!(approx_eq(ledger.saved_cost(), first.price));
}

#[tokio::test]
async fn temperature_is_part_of_the_cache_key() {
    let (mut session, mock) = session();

    session.call("hi", CallOptions::default()).await.unwrap();
    session.reset();
    let warm = session
        .call("hi", CallOptions::default().with_temperature(0.7))
        .await
        .unwrap();

    assert!(!warm.cached);
    assert_eq!(mock.chat_calls(), 2);
    assert_eq!(session.cache().len(), 2);
}

#[tokio::test]
async fn different_history_misses_cache() {
    let (mut session, mock) = session();

    session.call("hi", CallOptions::default()).await.unwrap();
    // Same message, longer history.
    let reply = session.call("hi", CallOptions::default()).await.unwrap();

    assert!(!reply.cached);
    assert_eq!(mock.chat_calls(), 2);
}

#[tokio::test]
async fn temporary_call_leaves_history_unchanged() {
    let (mut session, mock) = session_with(SessionOptions::default().with_system_prompt("sys"));
    session.call("keep me", CallOptions::default()).await.unwrap();
    let before = session.to_str();

    let reply = session
        .call("forget me", CallOptions::default().one_shot())
        .await
        .unwrap();

    assert_eq!(reply.content, "echo: forget me");
    assert_eq!(session.to_str(), before);
    // The temporary call still saw the prior history.
    assert_eq!(mock.last_messages().len(), 4);
}

#[tokio::test]
async fn temporary_cache_hit_leaves_history_unchanged() {
    let (mut session, _mock) = session();
    session.call("hi", CallOptions::default().one_shot()).await.unwrap();
    let before = session.to_str();

    let reply = session
        .call("hi", CallOptions::default().one_shot())
        .await
        .unwrap();

    assert!(reply.cached);
    assert_eq!(session.to_str(), before);
    assert_eq!(before, "");
}

#[tokio::test]
async fn non_interactive_session_makes_every_call_one_shot() {
    let (mut session, mock) = session_with(SessionOptions::default().with_interactive(false));

    session.call("first", CallOptions::default()).await.unwrap();
    session.call("second", CallOptions::default()).await.unwrap();

    assert!(session.conversation().is_empty());
    assert_eq!(mock.last_messages(), [Message::new(Role::User, "second")]);
}

#[tokio::test]
async fn upstream_failure_leaves_no_trace() {
    let (mut session, mock) = session();
    session.call("hi", CallOptions::default()).await.unwrap();
    let before = session.to_str();
    let cached_before = session.cache().len();

    mock.set_failing(true);
    let err = session
        .call("again", CallOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::Upstream(AiError::RateLimited)));
    assert_eq!(session.to_str(), before);
    assert_eq!(session.cache().len(), cached_before);
    assert_eq!(session.ledger().call_count(), 1);
}

#[tokio::test]
async fn unknown_model_fails_before_any_request() {
    let (mut session, mock) = session_with(SessionOptions::new("gpt-9"));

    let err = session.call("hi", CallOptions::default()).await.unwrap_err();

    assert!(matches!(
        err,
        ChatError::UnknownModel { ref name, kind: ModelKind::Text } if name == "gpt-9"
    ));
    assert_eq!(mock.chat_calls(), 0);
    assert!(session.conversation().is_empty());
    assert!(session.estimate_price("hi").is_err());
}

#[tokio::test]
async fn price_overrides_apply() {
    let options = SessionOptions::new("local-llm").with_price(PriceRow::new(
        "local-llm",
        ModelKind::Text,
        0.0,
        0.0,
    ));
    let (mut session, _mock) = session_with(options);

    let reply = session.call("hi", CallOptions::default()).await.unwrap();
    assert_eq!(reply.price, 0.0);
}

#[tokio::test]
async fn reset_matches_fresh_session() {
    let options = SessionOptions::default().with_system_prompt("You are terse.");
    let (fresh, _) = session_with(options.clone());
    let (mut session, _mock) = session_with(options);

    session.call("a", CallOptions::default()).await.unwrap();
    session.call("b", CallOptions::default()).await.unwrap();
    session.reset();

    assert_eq!(session.to_str(), fresh.to_str());
    assert_eq!(session.to_str(), "> system: \nYou are terse.");
}

#[test]
fn estimate_price_counts_history_and_message() {
    let (session, mock) = session();

    // 5 chars in, 5 * 1.1 + 20 = 25.5 out, at gpt-3.5-turbo rates.
    let expected = 5.0 / 1000.0 * 0.0015 + 25.5 / 1000.0 * 0.002;
    let estimate = session.estimate_price("hello").unwrap();

    assert!(approx_eq(estimate, expected), "got {estimate}");
    assert_eq!(mock.chat_calls(), 0);
}

#[tokio::test]
async fn estimate_price_grows_with_history_without_mutation() {
    let (mut session, _mock) = session();
    let empty_estimate = session.estimate_price("hello").unwrap();

    session.call("hi", CallOptions::default()).await.unwrap();
    let before = session.to_str();
    let estimate = session.estimate_price("hello").unwrap();

    assert!(estimate > empty_estimate);
    assert_eq!(session.to_str(), before);
    assert_eq!(session.cache().len(), 1);
}

#[tokio::test]
async fn embedding_flattens_newlines_and_records_spend() {
    let (mut session, mock) = session();
    session.call("hi", CallOptions::default()).await.unwrap();
    let before = session.to_str();

    let vector = session.embedding("line one\nline two").await.unwrap();

    assert_eq!(vector, vec![17.0, 1.0]);
    assert_eq!(
        *mock.state.last_inputs.lock().unwrap(),
        ["line one line two"]
    );
    assert_eq!(session.to_str(), before);
    assert_eq!(session.cache().len(), 1);

    let usage = session.ledger().for_model("text-embedding-ada-002").unwrap();
    assert_eq!(usage.usage.input_tokens, 8);
    assert!(approx_eq(usage.cost, 8.0 / 1000.0 * 0.0001));
}

#[tokio::test]
async fn embeddings_are_never_cached() {
    let (mut session, mock) = session();

    session.embedding("same").await.unwrap();
    session.embedding("same").await.unwrap();

    assert_eq!(mock.embed_calls(), 2);
}

#[tokio::test]
async fn embedding_batch_keeps_input_order() {
    let (mut session, mock) = session();

    let batch = session
        .embedding_batch(&["a", "bbb", "cc"])
        .await
        .unwrap();

    assert_eq!(mock.embed_calls(), 1);
    let lengths: Vec<f32> = batch.vectors.iter().map(|v| v[0]).collect();
    assert_eq!(lengths, [1.0, 3.0, 2.0]);
    assert!(approx_eq(batch.price, 24.0 / 1000.0 * 0.0001));
}

#[tokio::test]
async fn empty_embedding_batch_skips_request() {
    let (mut session, mock) = session();
    let batch = session.embedding_batch::<&str>(&[]).await.unwrap();
    assert!(batch.vectors.is_empty());
    assert_eq!(mock.embed_calls(), 0);
}

#[tokio::test]
async fn embedding_with_text_model_is_unknown() {
    let options = SessionOptions::default().with_embedding_model("gpt-4");
    let (mut session, mock) = session_with(options);

    let err = session.embedding("x").await.unwrap_err();

    assert!(matches!(
        err,
        ChatError::UnknownModel {
            kind: ModelKind::Embedding,
            ..
        }
    ));
    assert_eq!(mock.embed_calls(), 0);
}

#[tokio::test]
async fn embedding_failure_is_upstream_error() {
    let (mut session, mock) = session();
    mock.set_failing(true);

    let err = session.embedding("x").await.unwrap_err();
    assert!(matches!(err, ChatError::Upstream(AiError::NetworkError(_))));
    assert_eq!(session.ledger().call_count(), 0);
}

#[tokio::test]
async fn summarize_keeps_only_summary_exchange() {
    let (mut session, _mock) = session_with(SessionOptions::default().with_system_prompt("sys"));
    session.call("a", CallOptions::default()).await.unwrap();
    session.call("b", CallOptions::default()).await.unwrap();

    let reply = session.summarize_and_clear_history(None).await.unwrap();

    assert_eq!(reply.content, format!("echo: {DEFAULT_SUMMARY_PROMPT}"));
    let contents: Vec<_> = session
        .conversation()
        .messages()
        .iter()
        .map(|m| m.content.clone())
        .collect();
    assert_eq!(
        contents,
        [
            "sys".to_string(),
            DEFAULT_SUMMARY_PROMPT.to_string(),
            reply.content.clone()
        ]
    );
}

#[tokio::test]
async fn summarize_persists_even_when_not_interactive() {
    let (mut session, _mock) = session_with(SessionOptions::default().with_interactive(false));

    session
        .summarize_and_clear_history(Some("Recap please."))
        .await
        .unwrap();

    assert_eq!(session.conversation().len(), 2);
}

#[tokio::test]
async fn auto_save_persists_cache_for_next_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let options = SessionOptions::default().with_cache_path(&path);

    let (mut first, first_mock) = session_with(options.clone());
    first.call("hi", CallOptions::default()).await.unwrap();
    assert_eq!(first_mock.chat_calls(), 1);
    assert!(path.exists());

    let (mut second, second_mock) = session_with(options);
    assert_eq!(second.cache().len(), 1);
    let reply = second.call("hi", CallOptions::default()).await.unwrap();

    assert!(reply.cached);
    assert_eq!(second_mock.chat_calls(), 0);
}

#[tokio::test]
async fn auto_save_disabled_writes_nothing_until_asked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let options = SessionOptions::default()
        .with_cache_path(&path)
        .with_auto_save(false);

    let (mut session, _mock) = session_with(options);
    session.call("hi", CallOptions::default()).await.unwrap();
    assert!(!path.exists());

    session.save_cache().unwrap();
    assert!(path.exists());
}

#[test]
fn corrupt_cache_fails_auto_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    std::fs::write(&path, "garbage").unwrap();

    let options = SessionOptions::default().with_cache_path(&path);
    let result = ChatSession::new(Box::new(MockClient::default()), options.clone());
    assert!(matches!(result, Err(ChatError::CorruptCache { .. })));

    // Callers can opt to start empty instead.
    let session =
        ChatSession::new(Box::new(MockClient::default()), options.with_auto_load(false)).unwrap();
    assert!(session.cache().is_empty());
}

#[tokio::test]
async fn load_cache_merges_external_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.json");

    let (mut producer, _) = session();
    producer.call("hi", CallOptions::default()).await.unwrap();
    producer.cache().save(&path).unwrap();

    let (mut consumer, mock) = session();
    assert_eq!(consumer.load_cache(&path).unwrap(), 1);
    let reply = consumer.call("hi", CallOptions::default()).await.unwrap();

    assert!(reply.cached);
    assert_eq!(mock.chat_calls(), 0);
}

#[test]
fn options_from_config() {
    let mut config = chatmeter_config::ChatmeterConfig::default();
    config.models.text = "gpt-4".into();
    config.session.interactive = false;
    config.cache.path = Some("/tmp/chatmeter/cache.json".into());
    config.cache.auto_save = false;
    config.pricing.push(chatmeter_config::PricingRow {
        model: "gpt-4".into(),
        kind: ModelKind::Text,
        input_per_1k: 0.01,
        output_per_1k: 0.03,
    });

    let options = SessionOptions::from_config(&config).unwrap();
    assert_eq!(options.text_model, "gpt-4");
    assert!(!options.interactive);
    assert!(!options.auto_save);
    assert_eq!(
        options.cache_path.as_deref(),
        Some(std::path::Path::new("/tmp/chatmeter/cache.json"))
    );
    assert_eq!(options.price_overrides.len(), 1);
}

#[tokio::test]
async fn dropped_call_leaves_history_unchanged() {
    let options = SessionOptions::default().with_system_prompt("sys");
    let mut session = ChatSession::new(Box::new(StalledClient), options).unwrap();
    let before = session.to_str();

    for options in [CallOptions::default(), CallOptions::default().one_shot()] {
        let outcome =
            tokio::time::timeout(Duration::from_millis(50), session.call("hi", options)).await;
        assert!(outcome.is_err(), "call should still be pending");
        assert_eq!(session.to_str(), before);
    }

    assert!(session.cache().is_empty());
    assert_eq!(session.ledger().call_count(), 0);
}

#[tokio::test]
async fn history_is_sent_before_the_new_turn_is_recorded() {
    let (mut session, mock) = session();
    session.call("first", CallOptions::default()).await.unwrap();
    session.call("second", CallOptions::default()).await.unwrap();

    let sent: Vec<_> = mock.last_messages().into_iter().map(|m| m.content).collect();
    assert_eq!(sent, ["first", "echo: first", "second"]);
    assert_eq!(session.conversation().len(), 4);
}

#[tokio::test]
async fn non_interactive_calls_do_not_send_summary_turns() {
    let options = SessionOptions::default()
        .with_interactive(false)
        .with_system_prompt("sys");
    let (mut session, mock) = session_with(options);

    session.summarize_and_clear_history(None).await.unwrap();
    assert_eq!(session.conversation().len(), 3);

    session.call("fresh", CallOptions::default()).await.unwrap();

    assert_eq!(
        mock.last_messages(),
        [
            Message::new(Role::System, "sys"),
            Message::new(Role::User, "fresh")
        ]
    );
    assert!(session.conversation().is_empty());
}

#[test]
fn non_finite_price_override_rejected() {
    let options = SessionOptions::new("local-llm").with_price(PriceRow::new(
        "local-llm",
        ModelKind::Text,
        f64::NAN,
        0.0,
    ));

    let result = ChatSession::new(Box::new(MockClient::default()), options);
    match result {
        Err(ChatError::Config(ConfigError::ValidationError(msg))) => {
            assert!(msg.contains("local-llm.input_per_1k"), "got: {msg}");
        }
        Err(other) => panic!("expected validation error, got {other:?}"),
        Ok(_) => panic!("expected validation error, got a session"),
    }
}

#[test]
fn from_config_validates_before_connecting() {
    let mut config = chatmeter_config::ChatmeterConfig::default();
    config.api.api_key = Some("sk-test".into());
    config.api.request_timeout_secs = 0;

    let result = ChatSession::from_config(&config);
    assert!(matches!(
        result,
        Err(ChatError::Config(ConfigError::ValidationError(_)))
    ));
}
