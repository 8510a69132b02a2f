// ABOUTME: Tests for the OpenAI provider against a mock HTTP server
// ABOUTME: Verifies request shape, authentication, error mapping, and timeouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::time::Duration;

use saedam_server::{
    config::LlmConfig,
    errors::ErrorCode,
    llm::{ChatMessage, ChatRequest, LlmProvider, OpenAiProvider},
};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn provider_for(server: &MockServer, timeout: Duration) -> OpenAiProvider {
    OpenAiProvider::new(&LlmConfig {
        api_key: "sk-test".to_owned(),
        model: "gpt-4".to_owned(),
        base_url: format!("{}/v1/", server.uri()),
        timeout,
    })
    .unwrap()
}

fn request() -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::system("You are a fairy."),
        ChatMessage::user("hello"),
    ])
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "model": "gpt-4-0613",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
    })
}

#[tokio::test]
async fn test_completion_request_and_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4",
            "messages": [
                { "role": "system", "content": "You are a fairy." },
                { "role": "user", "content": "hello" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("안녕!")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, Duration::from_secs(5));
    let response = provider.complete(&request()).await.unwrap();

    assert_eq!(response.content, "안녕!");
    assert_eq!(response.model, "gpt-4-0613");
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 17);
}

#[tokio::test]
async fn test_request_model_overrides_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({ "model": "gpt-4o-mini" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, Duration::from_secs(5));
    let response = provider
        .complete(&request().with_model("gpt-4o-mini"))
        .await
        .unwrap();

    assert_eq!(response.content, "ok");
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let provider = provider_for(&server, Duration::from_secs(5));
    let err = provider.complete(&request()).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalServiceError);
    assert!(err.message.contains("no choices"));
}

#[tokio::test]
async fn test_unauthorized_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server, Duration::from_secs(5));
    let err = provider.complete(&request()).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalServiceError);
    assert!(err.message.contains("Authentication failed"));
    assert!(err.message.contains("Incorrect API key"));
}

#[tokio::test]
async fn test_unstructured_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let provider = provider_for(&server, Duration::from_secs(5));
    let err = provider.complete(&request()).await.unwrap_err();

    assert!(err.message.contains("502"));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server, Duration::from_millis(200));
    let err = provider.complete(&request()).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalTimeout);
}
