use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;

use sumweave::providers::{ChatClient, ChunkSummaryWorker, ProviderConfig, ProviderError};
use sumweave::worker::{TaskContext, Worker};

fn client_for(server: &MockServer) -> ChatClient {
    let config = ProviderConfig::openai("test-key").with_api_base(server.url("/v1"));
    ChatClient::new(config).unwrap()
}

#[tokio::test]
async fn completion_round_trip() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer test-key")
                .body_contains("\"model\":\"gpt-4o-mini\"")
                .body_contains("You are a helpful assistant");
            then.status(200).json_body(json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "A tidy summary." } }
                ]
            }));
        })
        .await;

    let client = client_for(&server);
    let completion = client.complete("Summarize this").await.unwrap();

    assert_eq!(completion, "A tidy summary.");
    mock.assert_async().await;
}

#[tokio::test]
async fn trailing_slash_in_api_base_is_tolerated() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({
                "choices": [{ "message": { "content": "ok" } }]
            }));
        })
        .await;

    let config = ProviderConfig::openai("test-key").with_api_base(format!("{}/", server.url("/v1")));
    let client = ChatClient::new(config).unwrap();

    assert_eq!(client.complete("hi").await.unwrap(), "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn http_failure_surfaces_status_and_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(429).body("quota exhausted");
        })
        .await;

    let err = client_for(&server).complete("hi").await.unwrap_err();
    match err {
        ProviderError::Status { status, body } => {
            assert_eq!(status.as_u16(), 429);
            assert_eq!(body, "quota exhausted");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn blank_completion_is_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({
                "choices": [{ "message": { "content": "   \n" } }]
            }));
        })
        .await;

    let err = client_for(&server).complete("hi").await.unwrap_err();
    assert!(matches!(err, ProviderError::EmptyCompletion));
}

#[tokio::test]
async fn missing_choices_are_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        })
        .await;

    let err = client_for(&server).complete("hi").await.unwrap_err();
    assert!(matches!(err, ProviderError::EmptyCompletion));
}

#[tokio::test]
async fn malformed_payload_is_a_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).body("not json at all");
        })
        .await;

    let err = client_for(&server).complete("hi").await.unwrap_err();
    assert!(matches!(err, ProviderError::Decode(_)));
}

#[tokio::test]
async fn chunk_worker_sends_prompt_and_text() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("Summarize the following")
                .body_contains("the raw chunk");
            then.status(200).json_body(json!({
                "choices": [{ "message": { "content": "partial summary" } }]
            }));
        })
        .await;

    let client = Arc::new(client_for(&server));
    let worker = ChunkSummaryWorker::new(client, "Summarize the following");

    let output = worker
        .process("the raw chunk".to_string(), TaskContext::new(0, 1))
        .await
        .unwrap();

    assert_eq!(output, "partial summary");
    mock.assert_async().await;
}

#[tokio::test]
async fn chunk_worker_wraps_provider_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(500).body("upstream broke");
        })
        .await;

    let client = Arc::new(client_for(&server));
    let worker = ChunkSummaryWorker::new(client, "Summarize");

    let err = worker
        .process("chunk".to_string(), TaskContext::new(3, 2))
        .await
        .unwrap_err();

    assert!(err.message.contains("500"));
    assert!(err.message.contains("upstream broke"));
    assert_eq!(err.details["model"], "gpt-4o-mini");
}
