//! Generic adapter for OpenAI-compatible chat services.
//!
//! OpenAI, DeepSeek, SiliconFlow, Groq, Hunyuan, Moonshot, Zhipu, Yi,
//! Doubao, Qwen, MiniMax, and Baichuan all speak the same
//! `POST {base}/chat/completions` protocol with Bearer auth; only the base
//! URL and default model differ, so one implementation serves the whole
//! family, driven by the provider's descriptor row.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::{resolve_endpoint, resolve_model};
use crate::error::GenError;
use crate::http::{join_url, read_json, send};
use crate::provider::ProviderDescriptor;
use crate::traits::TextGeneration;
use crate::types::{ConnectionTestResult, TextOptions};

use super::{apply_auth, require_key};

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 4000;

/// One OpenAI-compatible chat provider.
pub struct CompatChatAdapter {
    http: reqwest::Client,
    descriptor: &'static ProviderDescriptor,
}

impl CompatChatAdapter {
    pub fn new(http: reqwest::Client, descriptor: &'static ProviderDescriptor) -> Self {
        Self { http, descriptor }
    }

    fn chat_url(&self, options: &TextOptions) -> String {
        let base = resolve_endpoint(
            options.endpoint.as_deref(),
            None,
            self.descriptor.default_endpoint,
        );
        join_url(&base, "chat/completions")
    }

    async fn post_chat(
        &self,
        prompt: &str,
        api_key: &str,
        options: &TextOptions,
        max_tokens: u32,
    ) -> Result<Value, GenError> {
        let model = resolve_model(options.model.as_deref(), None, self.descriptor.default_model);
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &options.system_prompt {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": prompt }));

        let body = json!({
            "model": model,
            "messages": messages,
            "temperature": options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            "max_tokens": max_tokens,
        });

        let url = self.chat_url(options);
        debug!(provider = self.descriptor.id, %model, %url, "chat completion request");

        let request = apply_auth(
            self.http.post(&url).json(&body),
            self.descriptor.auth,
            api_key,
        );
        let response = send(self.descriptor.id, request).await?;
        read_json(self.descriptor.id, response).await
    }
}

#[async_trait]
impl TextGeneration for CompatChatAdapter {
    fn id(&self) -> &'static str {
        self.descriptor.id
    }

    async fn generate(
        &self,
        prompt: &str,
        api_key: &str,
        options: &TextOptions,
    ) -> Result<String, GenError> {
        require_key(self.descriptor, api_key)?;

        let json = self
            .post_chat(
                prompt,
                api_key,
                options,
                options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            )
            .await?;

        let content = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                GenError::shape(self.descriptor.id, "missing `choices[0].message.content`")
            })?;

        let content = content.trim();
        if content.is_empty() {
            return Err(GenError::shape(self.descriptor.id, "empty completion text"));
        }

        debug!(
            provider = self.descriptor.id,
            chars = content.len(),
            "chat completion succeeded"
        );
        Ok(content.to_string())
    }

    async fn test_connection(&self, api_key: &str, options: &TextOptions) -> ConnectionTestResult {
        if self.descriptor.requires_api_key && api_key.trim().is_empty() {
            return ConnectionTestResult::not_configured(self.descriptor.name);
        }

        // One-token completion: proves key + endpoint without a real
        // generation's cost or latency.
        match self.post_chat("ping", api_key, options, 1).await {
            Ok(json) if json.get("choices").is_some_and(Value::is_array) => {
                ConnectionTestResult::ok_with(
                    format!("{} API connection successful", self.descriptor.name),
                    json!({
                        "model": json.get("model").cloned().unwrap_or(Value::Null),
                    }),
                )
            }
            Ok(_) => ConnectionTestResult::fail(format!(
                "{} responded without a `choices` array; the endpoint may not be \
                 OpenAI-compatible",
                self.descriptor.name
            )),
            Err(e) => ConnectionTestResult::fail_with(
                format!("{} API connection failed", self.descriptor.name),
                json!({ "error": e.to_string() }),
            ),
        }
    }
}
