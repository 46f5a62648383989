//! Drives `LiteLlmClient` against an in-process mock completion endpoint.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use dre2flow_core::chat::ChatMessage;
use dre2flow_llm::{CompletionClient, CompletionOptions, LiteLlmClient, LlmConfig, LlmError};

#[derive(Clone, Default)]
struct Captured {
    auth: Arc<Mutex<Option<String>>>,
    body: Arc<Mutex<Option<Value>>>,
}

/// Start a mock server answering `/chat/completions` with `status` and `reply`.
async fn spawn_mock(status: StatusCode, reply: Value) -> (String, Captured) {
    let captured = Captured::default();

    let app = Router::new()
        .route(
            "/chat/completions",
            post(
                move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        *captured.auth.lock().unwrap() = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(String::from);
                        *captured.body.lock().unwrap() = Some(body);
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(captured.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), captured)
}

fn client(base: &str) -> LiteLlmClient {
    LiteLlmClient::new(&LlmConfig {
        api_base: Some(base.to_string()),
        api_key: Some("sk-local".into()),
        model: "gpt-4o".into(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn returns_first_choice_content() {
    let (base, captured) = spawn_mock(
        StatusCode::OK,
        json!({ "choices": [{ "message": { "role": "assistant", "content": "Hello world" } }] }),
    )
    .await;

    let reply = client(&base)
        .complete(
            &[ChatMessage::user("Say hello world")],
            &CompletionOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(reply, "Hello world");

    assert_eq!(
        captured.auth.lock().unwrap().as_deref(),
        Some("Bearer sk-local")
    );
    let body = captured.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["messages"][0]["content"], "Say hello world");
    assert!(body.get("temperature").is_none());
}

#[tokio::test]
async fn sends_translation_options() {
    let (base, captured) = spawn_mock(
        StatusCode::OK,
        json!({ "choices": [{ "message": { "content": "[]" } }] }),
    )
    .await;

    client(&base)
        .complete(&[ChatMessage::system("x")], &CompletionOptions::TRANSLATION)
        .await
        .unwrap();

    let body = captured.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["max_tokens"], 2000);
}

#[tokio::test]
async fn non_success_status_is_api_error() {
    let (base, _) = spawn_mock(
        StatusCode::UNAUTHORIZED,
        json!({ "error": { "message": "bad key" } }),
    )
    .await;

    let err = client(&base)
        .complete(&[ChatMessage::user("hi")], &CompletionOptions::default())
        .await
        .unwrap_err();
    assert_matches!(err, LlmError::Api { status: 401, ref body } if body.contains("bad key"));
}

#[tokio::test]
async fn empty_choices_is_empty_response() {
    let (base, _) = spawn_mock(StatusCode::OK, json!({ "choices": [] })).await;

    let err = client(&base)
        .complete(&[ChatMessage::user("hi")], &CompletionOptions::default())
        .await
        .unwrap_err();
    assert_matches!(err, LlmError::EmptyResponse);
}

#[tokio::test]
async fn unconfigured_client_fails_without_a_request() {
    let client = LiteLlmClient::new(&LlmConfig {
        api_base: None,
        api_key: None,
        model: "gpt-4o".into(),
        timeout_secs: 5,
    })
    .unwrap();

    let err = client
        .complete(&[ChatMessage::user("hi")], &CompletionOptions::default())
        .await
        .unwrap_err();
    assert_matches!(err, LlmError::NotConfigured(_));
}
