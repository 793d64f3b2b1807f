//! Mock API tests for the Anthropic Claude adapter.
//!
//! Response shapes follow the Messages API reference:
//! https://docs.anthropic.com/en/api/messages

use serde_json::json;
use tripmuse::prelude::*;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn messages_body(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20241022",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 10, "output_tokens": 25 }
    })
}

fn anthropic_error(error_type: &str, message: &str) -> serde_json::Value {
    json!({ "type": "error", "error": { "type": error_type, "message": message } })
}

#[tokio::test]
async fn claude_generate_parses_content_and_sends_exact_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_body("bonjour")))
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("claude", "sk-ant-test").with_endpoint(server.uri());
    let result = client
        .generate_text("claude", "hello", Some(&credential), &TextOptions::default())
        .await
        .unwrap();

    assert_eq!(result, "bonjour");
}

#[tokio::test]
async fn claude_error_envelope_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(anthropic_error("authentication_error", "invalid x-api-key")),
        )
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("claude", "sk-ant-bad").with_endpoint(server.uri());
    let err = client
        .generate_text("claude", "hello", Some(&credential), &TextOptions::default())
        .await
        .unwrap_err();

    match err {
        GenError::AuthenticationError(msg) => {
            assert!(msg.contains("invalid or expired"));
            assert!(msg.contains("invalid x-api-key"));
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[tokio::test]
async fn claude_missing_content_is_a_shape_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "type": "message" })))
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("claude", "sk-ant-test").with_endpoint(server.uri());
    let err = client
        .generate_text("claude", "hello", Some(&credential), &TextOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GenError::ResponseShapeError(_)));
    assert!(err.to_string().contains("content"));
}

#[tokio::test]
async fn claude_test_connection_without_credential_reports_not_configured() {
    let client = Client::new().unwrap();
    let report = client.test_connection("claude", None).await;

    assert!(!report.success);
    assert!(report.message.contains("not configured"));
}

#[tokio::test]
async fn claude_test_connection_with_valid_key_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_body("pong")))
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("claude", "sk-ant-test").with_endpoint(server.uri());
    let report = client.test_connection("claude", Some(&credential)).await;

    assert!(report.success, "unexpected failure: {}", report.message);
}

#[tokio::test]
async fn claude_test_connection_survives_rate_limit_as_failed_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(anthropic_error("rate_limit_error", "slow down")),
        )
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("claude", "sk-ant-test").with_endpoint(server.uri());
    let report = client.test_connection("claude", Some(&credential)).await;

    assert!(!report.success);
    let details = report.details.unwrap();
    assert!(details["error"].as_str().unwrap().contains("429"));
}
