//! Request options, results, and the connection-test report type.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// The two logical request classes served by this crate. Credential storage
/// and config resolution are keyed by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Text,
    Image,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

/// Options for a text generation call. All fields are optional; unset fields
/// fall back to the stored credential's overrides and then to the provider's
/// compiled-in defaults.
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    /// Explicit endpoint override. Wins over the stored custom endpoint.
    pub endpoint: Option<String>,
    /// Model override. Wins over the stored model.
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Prepended as a `system` message by adapters that support one.
    pub system_prompt: Option<String>,
}

/// Options for an image generation call. Providers read the subset of
/// fields their API understands and ignore the rest.
#[derive(Debug, Clone, Default)]
pub struct ImageOptions {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    /// Pixel dimensions for providers addressed by width/height.
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// `"1024x1024"`-style size string for OpenAI-images providers.
    pub size: Option<String>,
    /// `"standard"` or `"hd"` (DALL-E).
    pub quality: Option<String>,
    /// `"vivid"` or `"natural"` (DALL-E).
    pub style: Option<String>,
    /// Stability style preset (`"photographic"`, `"digital-art"`, ...).
    pub style_preset: Option<String>,
    pub negative_prompt: Option<String>,
    pub steps: Option<u32>,
    pub cfg_scale: Option<f32>,
    /// Deterministic seed where the provider supports one.
    pub seed: Option<i64>,
    /// Checked between polling iterations by task-based adapters; has no
    /// effect on single-request providers.
    pub cancel: Option<CancellationToken>,
}

/// A displayable image reference: either a `data:image/...;base64,...` URI
/// or a hosted `http(s)://` URL. Consumers can hand either form straight to
/// an `<img>`-like sink, so the two are carried as one string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap provider-supplied base64 payload as a data URI.
    pub fn data_uri(format: &str, base64_payload: &str) -> Self {
        Self(format!("data:image/{format};base64,{base64_payload}"))
    }

    /// Wrap a hosted URL.
    pub fn url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:image/")
    }

    pub fn is_url(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a generation call, for consumers that handle both categories
/// through one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationResult {
    Text { content: String },
    Image { image: ImageRef },
}

/// Outcome of a connectivity test. Tests are queries: they always resolve
/// with this report and never return an error, so UI code can render
/// pass/fail without its own error handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ConnectionTestResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            details: None,
        }
    }

    pub fn ok_with(message: impl Into<String>, details: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: None,
        }
    }

    pub fn fail_with(message: impl Into<String>, details: Value) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Standard report for a provider that has no stored or supplied key.
    pub fn not_configured(provider_name: &str) -> Self {
        Self::fail(format!("{provider_name} API key not configured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_ref_forms() {
        let data = ImageRef::data_uri("png", "aGVsbG8=");
        assert!(data.is_data_uri());
        assert!(!data.is_url());
        assert_eq!(data.as_str(), "data:image/png;base64,aGVsbG8=");

        let url = ImageRef::url("https://example.com/a.png");
        assert!(url.is_url());
        assert!(!url.is_data_uri());
    }

    #[test]
    fn not_configured_message_is_stable() {
        let r = ConnectionTestResult::not_configured("Anthropic Claude");
        assert!(!r.success);
        assert!(r.message.contains("not configured"));
    }

    #[test]
    fn generation_result_serializes_tagged() {
        let v = serde_json::to_value(GenerationResult::Text {
            content: "hi".into(),
        })
        .unwrap();
        assert_eq!(v["kind"], "text");
        assert_eq!(v["content"], "hi");
    }
}
