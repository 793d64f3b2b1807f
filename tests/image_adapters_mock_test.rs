//! Mock API tests for the single-request image adapters (DALL-E family and
//! Stability AI).

use serde_json::json;
use tripmuse::prelude::*;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TINY_PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR4nGNgYGBgAAAABQABh6FO1AAAAABJRU5ErkJggg==";

#[tokio::test]
async fn dalle_b64_response_normalizes_to_data_uri() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .and(header("Authorization", "Bearer sk-img"))
        .and(body_partial_json(json!({
            "model": "dall-e-3",
            "response_format": "b64_json"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1700000000,
            "data": [{ "b64_json": TINY_PNG_B64, "revised_prompt": "a sunlit harbor" }]
        })))
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("openai_dalle", "sk-img").with_endpoint(server.uri());
    let image = client
        .generate_image("openai_dalle", "a sunlit harbor", Some(&credential), &ImageOptions::default())
        .await
        .unwrap();

    assert!(image.is_data_uri());
    assert!(image.as_str().starts_with("data:image/png;base64,"));
    assert!(image.as_str().ends_with(TINY_PNG_B64));
}

#[tokio::test]
async fn dalle_url_response_passes_through_as_hosted_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1700000000,
            "data": [{ "url": "https://images.example.com/gen/42.png" }]
        })))
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("openai_dalle", "sk-img").with_endpoint(server.uri());
    let image = client
        .generate_image("openai_dalle", "a harbor", Some(&credential), &ImageOptions::default())
        .await
        .unwrap();

    assert!(image.is_url());
    assert_eq!(image.as_str(), "https://images.example.com/gen/42.png");
}

#[tokio::test]
async fn dalle_empty_data_is_a_shape_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("openai_dalle", "sk-img").with_endpoint(server.uri());
    let err = client
        .generate_image("openai_dalle", "a harbor", Some(&credential), &ImageOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GenError::ResponseShapeError(_)));
}

#[tokio::test]
async fn b3n_sends_bare_authorization_header() {
    let server = MockServer::start().await;
    // The raw key, no "Bearer " prefix.
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .and(header("Authorization", "b3n-key-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "url": "https://cdn.b3n.example/1.png" }]
        })))
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("b3n", "b3n-key-123").with_endpoint(server.uri());
    let image = client
        .generate_image("b3n", "a harbor", Some(&credential), &ImageOptions::default())
        .await
        .unwrap();
    assert!(image.is_url());
}

#[tokio::test]
async fn stability_artifacts_normalize_to_data_uri() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image",
        ))
        .and(header("Authorization", "Bearer sk-stab"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artifacts": [{ "base64": TINY_PNG_B64, "seed": 1050625087, "finish_reason": "SUCCESS" }]
        })))
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("stability", "sk-stab").with_endpoint(server.uri());
    let image = client
        .generate_image("stability", "a mountain lake", Some(&credential), &ImageOptions::default())
        .await
        .unwrap();

    assert!(image.is_data_uri());
}

#[tokio::test]
async fn stability_model_override_changes_the_engine_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/generation/sd3.5-large/text-to-image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artifacts": [{ "base64": TINY_PNG_B64, "seed": 7, "finish_reason": "SUCCESS" }]
        })))
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("stability", "sk-stab")
        .with_endpoint(server.uri())
        .with_model("sd3.5-large");
    let image = client
        .generate_image("stability", "a mountain lake", Some(&credential), &ImageOptions::default())
        .await
        .unwrap();
    assert!(image.is_data_uri());
}

#[tokio::test]
async fn stability_missing_artifacts_is_a_shape_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "artifacts": [] })))
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("stability", "sk-stab").with_endpoint(server.uri());
    let err = client
        .generate_image("stability", "a lake", Some(&credential), &ImageOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GenError::ResponseShapeError(_)));
}

#[tokio::test]
async fn stability_test_connection_probes_account_not_generation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/user/account"))
        .and(header("Authorization", "Bearer sk-stab"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "acct-1",
            "credits": 123.4
        })))
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("stability", "sk-stab").with_endpoint(server.uri());
    let report = client.test_connection("stability", Some(&credential)).await;

    assert!(report.success, "unexpected failure: {}", report.message);
    assert_eq!(report.details.unwrap()["id"], "acct-1");
}

#[tokio::test]
async fn image_test_connection_with_429_reports_failure_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(429).set_body_string("too many requests"))
        .mount(&server)
        .await;

    let client = Client::new().unwrap();
    let credential = ApiCredential::new("openai_dalle", "sk-img").with_endpoint(server.uri());
    let report = client.test_connection("openai_dalle", Some(&credential)).await;

    assert!(!report.success);
    assert!(
        report.details.unwrap()["error"]
            .as_str()
            .unwrap()
            .contains("429")
    );
}

#[tokio::test]
async fn pollinations_generates_a_url_with_no_key() {
    let client = Client::new().unwrap();
    let options = ImageOptions {
        seed: Some(11),
        ..ImageOptions::default()
    };
    let image = client
        .generate_image("pollinations", "lantern festival over a river", None, &options)
        .await
        .unwrap();

    assert!(image.is_url());
    assert!(image.as_str().contains("lantern"));
    assert!(image.as_str().contains("seed=11"));
}
