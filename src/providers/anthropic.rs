//! Anthropic Claude adapter.
//!
//! Claude does not speak the OpenAI chat protocol: auth is an `x-api-key`
//! header plus a pinned `anthropic-version`, the endpoint is
//! `POST {base}/v1/messages`, and the reply carries `content[0].text`.
//! Errors arrive in a structured envelope that is classified before the
//! generic status mapping.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::{resolve_endpoint, resolve_model};
use crate::error::{GenError, classify_http_status, network_error};
use crate::http::join_url;
use crate::provider::{self, ProviderDescriptor};
use crate::traits::TextGeneration;
use crate::types::{ConnectionTestResult, TextOptions};

use super::require_key;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 4000;

pub struct AnthropicAdapter {
    http: reqwest::Client,
    descriptor: &'static ProviderDescriptor,
}

impl AnthropicAdapter {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            descriptor: provider::descriptor("claude").expect("claude descriptor is compiled in"),
        }
    }

    async fn post_messages(
        &self,
        prompt: &str,
        api_key: &str,
        options: &TextOptions,
        max_tokens: u32,
    ) -> Result<Value, GenError> {
        let base = resolve_endpoint(
            options.endpoint.as_deref(),
            None,
            self.descriptor.default_endpoint,
        );
        let url = join_url(&base, "v1/messages");
        let model = resolve_model(options.model.as_deref(), None, self.descriptor.default_model);

        let mut body = json!({
            "model": model,
            "max_tokens": max_tokens,
            "temperature": options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            "messages": [{ "role": "user", "content": prompt }],
        });
        if let Some(system) = &options.system_prompt {
            body["system"] = json!(system);
        }

        debug!(provider = "claude", %model, %url, "messages request");

        let response = self
            .http
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error("claude", &e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| network_error("claude", &e))?;

        if !(200..300).contains(&status) {
            return Err(classify_error(status, &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| GenError::shape("claude", format!("body is not valid JSON ({e})")))
    }
}

/// Classify an Anthropic HTTP failure by its structured envelope
/// (`{"type":"error","error":{"type":...,"message":...}}`), falling back to
/// the generic status classifier when the body doesn't match.
fn classify_error(status: u16, body: &str) -> GenError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let envelope = parsed
        .as_ref()
        .and_then(|json| json.get("error"))
        .and_then(|e| {
            Some((
                e.get("type")?.as_str()?.to_string(),
                e.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            ))
        });

    let Some((error_type, message)) = envelope else {
        return classify_http_status("claude", status, body);
    };

    match error_type.as_str() {
        "authentication_error" | "permission_error" => GenError::AuthenticationError(format!(
            "claude: invalid or expired API key (HTTP {status}): {message}"
        )),
        "rate_limit_error" => GenError::RateLimitError(format!(
            "claude: rate limited, retry later (HTTP {status}): {message}"
        )),
        "invalid_request_error" => GenError::InvalidInput(format!("claude: {message}")),
        "overloaded_error" => GenError::ApiError {
            code: 503,
            message: format!("claude: service overloaded: {message}"),
            details: parsed,
        },
        other => GenError::ApiError {
            code: status,
            message: format!("claude: {other}: {message}"),
            details: parsed,
        },
    }
}

#[async_trait]
impl TextGeneration for AnthropicAdapter {
    fn id(&self) -> &'static str {
        "claude"
    }

    async fn generate(
        &self,
        prompt: &str,
        api_key: &str,
        options: &TextOptions,
    ) -> Result<String, GenError> {
        require_key(self.descriptor, api_key)?;

        let json = self
            .post_messages(
                prompt,
                api_key,
                options,
                options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            )
            .await?;

        let content = json
            .get("content")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("text"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| GenError::shape("claude", "missing `content[0].text`"))?;

        let content = content.trim();
        if content.is_empty() {
            return Err(GenError::shape("claude", "empty completion text"));
        }
        Ok(content.to_string())
    }

    async fn test_connection(&self, api_key: &str, options: &TextOptions) -> ConnectionTestResult {
        if api_key.trim().is_empty() {
            return ConnectionTestResult::not_configured(self.descriptor.name);
        }

        match self.post_messages("ping", api_key, options, 1).await {
            Ok(json) if json.get("content").is_some_and(Value::is_array) => {
                ConnectionTestResult::ok_with(
                    "Anthropic Claude API connection successful",
                    json!({ "model": json.get("model").cloned().unwrap_or(Value::Null) }),
                )
            }
            Ok(_) => ConnectionTestResult::fail(
                "Anthropic Claude responded without a `content` array; check the endpoint",
            ),
            Err(e) => ConnectionTestResult::fail_with(
                "Anthropic Claude API connection failed",
                json!({ "error": e.to_string() }),
            ),
        }
    }
}
