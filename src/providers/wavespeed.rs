//! WaveSpeed AI adapter: the task-based (submit, then poll) image provider.
//!
//! `POST {base}/api/v3/wavespeed-ai/{model}` returns a task id; results are
//! fetched from `GET {base}/api/v3/predictions/{id}/result` through the
//! shared bounded poller. A provider-reported `failed` state and an
//! exhausted polling budget surface as different errors.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::{resolve_endpoint, resolve_model};
use crate::error::GenError;
use crate::http::{join_url, read_json, send};
use crate::polling::{PollConfig, PollOutcome, poll_until};
use crate::provider::{self, ProviderDescriptor};
use crate::traits::ImageGeneration;
use crate::types::{ConnectionTestResult, ImageOptions, ImageRef};

use super::require_key;

const DEFAULT_DIMENSION: u32 = 1024;

pub struct WaveSpeedAdapter {
    http: reqwest::Client,
    descriptor: &'static ProviderDescriptor,
    poll: PollConfig,
}

impl WaveSpeedAdapter {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            descriptor: provider::descriptor("wavespeed")
                .expect("wavespeed descriptor is compiled in"),
            poll: PollConfig::default(),
        }
    }

    /// Override the polling schedule (tests use a millisecond interval).
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    fn base_url(&self, options: &ImageOptions) -> String {
        resolve_endpoint(
            options.endpoint.as_deref(),
            None,
            self.descriptor.default_endpoint,
        )
    }

    async fn submit(
        &self,
        prompt: &str,
        api_key: &str,
        options: &ImageOptions,
    ) -> Result<String, GenError> {
        let model = resolve_model(options.model.as_deref(), None, self.descriptor.default_model);
        let url = join_url(&self.base_url(options), &format!("api/v3/wavespeed-ai/{model}"));
        let body = json!({
            "prompt": prompt,
            "size": format!(
                "{}*{}",
                options.width.unwrap_or(DEFAULT_DIMENSION),
                options.height.unwrap_or(DEFAULT_DIMENSION)
            ),
            "seed": options.seed.unwrap_or(-1),
            "enable_base64_output": false,
            "enable_safety_checker": true,
        });

        debug!(provider = "wavespeed", %model, %url, "task submit");

        let request = self.http.post(&url).bearer_auth(api_key).json(&body);
        let response = send("wavespeed", request).await?;
        let json = read_json("wavespeed", response).await?;

        json.get("data")
            .and_then(|d| d.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GenError::shape("wavespeed", "missing `data.id` in submit response"))
    }

    async fn poll_result(&self, task_id: &str, api_key: &str, url: &str) -> Result<PollOutcome<ImageRef>, GenError> {
        let request = self.http.get(url).bearer_auth(api_key);
        let response = send("wavespeed", request).await?;

        // Transient server hiccups keep polling; auth/quota problems abort.
        let status = response.status().as_u16();
        if status >= 500 {
            debug!(provider = "wavespeed", task_id, %status, "transient poll failure");
            return Ok(PollOutcome::Pending);
        }
        let json = read_json("wavespeed", response).await?;

        let data = json
            .get("data")
            .ok_or_else(|| GenError::shape("wavespeed", "missing `data` in poll response"))?;
        let state = data
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| GenError::shape("wavespeed", "missing `data.status`"))?;

        match state {
            "completed" => {
                let output = data
                    .get("outputs")
                    .and_then(|o| o.get(0))
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        GenError::shape("wavespeed", "completed task without `data.outputs[0]`")
                    })?;
                Ok(PollOutcome::Ready(ImageRef::url(output)))
            }
            "failed" => {
                let reason = data
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("no reason given");
                Err(GenError::ApiError {
                    code: 200,
                    message: format!("wavespeed: generation failed: {reason}"),
                    details: Some(data.clone()),
                })
            }
            _ => Ok(PollOutcome::Pending),
        }
    }
}

#[async_trait]
impl ImageGeneration for WaveSpeedAdapter {
    fn id(&self) -> &'static str {
        "wavespeed"
    }

    async fn generate(
        &self,
        prompt: &str,
        api_key: &str,
        options: &ImageOptions,
    ) -> Result<ImageRef, GenError> {
        require_key(self.descriptor, api_key)?;

        let task_id = self.submit(prompt, api_key, options).await?;
        let url = join_url(
            &self.base_url(options),
            &format!("api/v3/predictions/{task_id}/result"),
        );

        poll_until(&self.poll, options.cancel.as_ref(), |attempt| {
            debug!(provider = "wavespeed", task_id = %task_id, attempt, "polling task result");
            self.poll_result(&task_id, api_key, &url)
        })
        .await
    }

    async fn test_connection(
        &self,
        api_key: &str,
        options: &ImageOptions,
    ) -> ConnectionTestResult {
        if api_key.trim().is_empty() {
            return ConnectionTestResult::not_configured(self.descriptor.name);
        }

        // Probing a known-missing prediction id proves the endpoint and key
        // without submitting a billable task: 401/403 means the key was
        // rejected, anything else means we reached an authorized API.
        let url = join_url(
            &self.base_url(options),
            "api/v3/predictions/connectivity-probe/result",
        );
        let request = self.http.get(&url).bearer_auth(api_key);
        match request.send().await {
            Ok(response) => match response.status().as_u16() {
                401 | 403 => ConnectionTestResult::fail(
                    "WaveSpeed AI rejected the API key (invalid or expired)",
                ),
                status => ConnectionTestResult::ok_with(
                    "WaveSpeed AI API connection successful",
                    json!({ "probe_status": status }),
                ),
            },
            Err(e) => ConnectionTestResult::fail_with(
                "WaveSpeed AI API connection failed",
                json!({ "error": crate::error::network_error("wavespeed", &e).to_string() }),
            ),
        }
    }
}
