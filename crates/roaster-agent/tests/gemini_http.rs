// HTTP-level behaviour of the Gemini client and the reply pipeline against a
// mock generateContent endpoint.

use std::time::Duration;

use roaster_agent::pipeline::{process_message, MessageContext, ProcessedReply};
use roaster_agent::prompt::PromptBuilder;
use roaster_agent::{AgentRuntime, ChatRequest, GeminiProvider, LlmProvider, ProviderError};
use roaster_core::config::PromptConfig;
use roaster_core::{ConversationId, ConversationTurn, TurnLabels};
use roaster_memory::{HistoryManager, WindowLimits};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new("test-key".to_string(), Some(server.uri()), None).unwrap()
}

fn request(prompt: &str) -> ChatRequest {
    ChatRequest {
        model: "gemini-2.5-flash".to_string(),
        prompt: prompt.to_string(),
    }
}

fn hello_body() -> serde_json::Value {
    json!({"candidates":[{"content":{"parts":[{"text":"Hello"}]}}]})
}

struct Ctx {
    agent: AgentRuntime,
    history: HistoryManager,
}

impl MessageContext for Ctx {
    fn agent(&self) -> &AgentRuntime {
        &self.agent
    }
    fn history(&self) -> &HistoryManager {
        &self.history
    }
}

fn ctx(server: &MockServer) -> Ctx {
    let agent = AgentRuntime::new(
        Box::new(provider(server)),
        PromptBuilder::new(&PromptConfig::default()),
        "gemini-2.5-flash".to_string(),
    )
    .with_request_delay(Duration::ZERO);
    Ctx {
        agent,
        history: HistoryManager::new(WindowLimits::default(), TurnLabels::default()),
    }
}

#[tokio::test]
async fn posts_prompt_with_key_and_reads_first_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"contents":[{"parts":[{"text":"hi there"}]}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(hello_body()))
        .expect(1)
        .mount(&server)
        .await;

    let resp = provider(&server).send(&request("hi there")).await.unwrap();
    assert_eq!(resp.content, "Hello");
}

#[tokio::test]
async fn non_200_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = provider(&server).send(&request("x")).await.unwrap_err();
    match err {
        ProviderError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn other_2xx_is_still_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let err = provider(&server).send(&request("x")).await.unwrap_err();
    assert!(matches!(err, ProviderError::Status { status: 204, .. }));
}

#[tokio::test]
async fn garbage_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server).send(&request("x")).await.unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[tokio::test]
async fn unreachable_host_is_transport_error_without_key() {
    // Port 9 (discard) on localhost is expected to refuse connections.
    let provider = GeminiProvider::new(
        "secret-key".to_string(),
        Some("http://127.0.0.1:9".into()),
        Some(Duration::from_secs(5)),
    )
    .unwrap();
    let err = provider.send(&request("x")).await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
    assert!(!err.to_string().contains("secret-key"));
    assert!(!err.user_message().contains("secret-key"));
}

#[tokio::test]
async fn pipeline_success_appends_one_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(hello_body()))
        .mount(&server)
        .await;

    let ctx = ctx(&server);
    let chat = ConversationId(42);
    let reply = process_message(&ctx, chat, "Привіт").await;

    assert!(matches!(&reply, ProcessedReply::Answer { html, .. } if html == "Hello"));
    assert_eq!(ctx.history().turn_count(chat).await, 1);
}

#[tokio::test]
async fn pipeline_quota_error_keeps_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"error":{"code":429}})))
        .mount(&server)
        .await;

    let ctx = ctx(&server);
    let chat = ConversationId(7);
    {
        let mut guard = ctx.history().lock(chat).await;
        guard.record(ConversationTurn::new("earlier", "answer"));
    }

    let reply = process_message(&ctx, chat, "again").await;
    assert_eq!(
        reply.into_html(),
        "Помилка API: 429. Перевірте квоту на https://ai.google.dev/gemini-api/docs/rate-limits!"
    );
    assert_eq!(ctx.history().turn_count(chat).await, 1);
}

#[tokio::test]
async fn pipeline_sends_history_in_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hello_body()))
        .expect(2)
        .mount(&server)
        .await;

    let ctx = ctx(&server);
    let chat = ConversationId(1);
    process_message(&ctx, chat, "перше").await;
    process_message(&ctx, chat, "друге").await;

    let requests = server.received_requests().await.unwrap();
    let second: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    let prompt = second["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("User: перше\nBot: Hello\n"));
    assert!(prompt.ends_with("Повідомлення: друге"));
}
