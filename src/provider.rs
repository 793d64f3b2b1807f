//! Compiled-in provider metadata.
//!
//! One [`ProviderDescriptor`] per supported service. The set is closed at
//! compile time; adding a provider means adding a row here and registering
//! an adapter in [`crate::registry`].

use serde::{Deserialize, Serialize};

/// Which logical request class a provider serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    Text,
    Image,
    Both,
}

impl ProviderCategory {
    pub fn serves_text(self) -> bool {
        matches!(self, Self::Text | Self::Both)
    }

    pub fn serves_image(self) -> bool {
        matches!(self, Self::Image | Self::Both)
    }
}

/// How an adapter presents the API key on the wire. Fixed per provider;
/// getting this wrong produces silent 401s, so it is deliberately not
/// configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `Authorization: <key>` with no scheme prefix (B3N-style aggregators).
    RawAuthorization,
    /// `x-api-key: <key>` plus a version header (Anthropic).
    XApiKey,
    /// `?key=<key>` query parameter (Google Gemini).
    QueryKey,
    /// No authentication at all (free services).
    None,
}

/// Static description of one supported provider.
#[derive(Debug, Clone, Copy)]
pub struct ProviderDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub category: ProviderCategory,
    pub default_endpoint: &'static str,
    pub default_model: &'static str,
    pub auth: AuthScheme,
    /// Known key prefix, used only for advisory format hints.
    pub key_prefix_hint: Option<&'static str>,
    /// `false` for free services that accept-and-ignore a key.
    pub requires_api_key: bool,
}

/// All supported providers. Order matches the settings UI listing.
pub const PROVIDERS: &[ProviderDescriptor] = &[
    // Text: OpenAI-compatible chat providers.
    ProviderDescriptor {
        id: "openai",
        name: "OpenAI GPT",
        category: ProviderCategory::Text,
        default_endpoint: "https://api.openai.com/v1",
        default_model: "gpt-4o",
        auth: AuthScheme::Bearer,
        key_prefix_hint: Some("sk-"),
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "deepseek",
        name: "DeepSeek API",
        category: ProviderCategory::Text,
        default_endpoint: "https://api.deepseek.com/v1",
        default_model: "deepseek-chat",
        auth: AuthScheme::Bearer,
        key_prefix_hint: Some("sk-"),
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "siliconflow",
        name: "SiliconFlow",
        category: ProviderCategory::Text,
        default_endpoint: "https://api.siliconflow.cn/v1",
        default_model: "Qwen/Qwen2.5-72B-Instruct",
        auth: AuthScheme::Bearer,
        key_prefix_hint: Some("sk-"),
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "groq",
        name: "Groq",
        category: ProviderCategory::Text,
        default_endpoint: "https://api.groq.com/openai/v1",
        default_model: "llama-3.3-70b-versatile",
        auth: AuthScheme::Bearer,
        key_prefix_hint: Some("gsk_"),
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "hunyuan",
        name: "Tencent Hunyuan",
        category: ProviderCategory::Text,
        default_endpoint: "https://api.hunyuan.cloud.tencent.com/v1",
        default_model: "hunyuan-turbo",
        auth: AuthScheme::Bearer,
        key_prefix_hint: None,
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "moonshot",
        name: "Moonshot Kimi",
        category: ProviderCategory::Text,
        default_endpoint: "https://api.moonshot.cn/v1",
        default_model: "moonshot-v1-128k",
        auth: AuthScheme::Bearer,
        key_prefix_hint: Some("sk-"),
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "zhipu",
        name: "Zhipu GLM",
        category: ProviderCategory::Text,
        default_endpoint: "https://open.bigmodel.cn/api/paas/v4",
        default_model: "glm-4-plus",
        auth: AuthScheme::Bearer,
        key_prefix_hint: None,
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "yi",
        name: "01.AI Yi",
        category: ProviderCategory::Text,
        default_endpoint: "https://api.lingyiwanwu.com/v1",
        default_model: "yi-large",
        auth: AuthScheme::Bearer,
        key_prefix_hint: None,
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "doubao",
        name: "ByteDance Doubao",
        category: ProviderCategory::Text,
        default_endpoint: "https://ark.cn-beijing.volces.com/api/v3",
        default_model: "doubao-pro-32k",
        auth: AuthScheme::Bearer,
        key_prefix_hint: None,
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "qwen",
        name: "Alibaba Qwen",
        category: ProviderCategory::Text,
        default_endpoint: "https://dashscope.aliyuncs.com/compatible-mode/v1",
        default_model: "qwen2.5-72b-instruct",
        auth: AuthScheme::Bearer,
        key_prefix_hint: Some("sk-"),
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "minimax",
        name: "MiniMax",
        category: ProviderCategory::Text,
        default_endpoint: "https://api.minimax.chat/v1",
        default_model: "abab6.5s-chat",
        auth: AuthScheme::Bearer,
        key_prefix_hint: None,
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "baichuan",
        name: "Baichuan",
        category: ProviderCategory::Text,
        default_endpoint: "https://api.baichuan-ai.com/v1",
        default_model: "baichuan4",
        auth: AuthScheme::Bearer,
        key_prefix_hint: Some("sk-"),
        requires_api_key: true,
    },
    // Text: native protocols.
    ProviderDescriptor {
        id: "gemini",
        name: "Google Gemini",
        category: ProviderCategory::Text,
        default_endpoint: "https://generativelanguage.googleapis.com/v1beta",
        default_model: "gemini-2.0-flash-exp",
        auth: AuthScheme::QueryKey,
        key_prefix_hint: Some("AIza"),
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "claude",
        name: "Anthropic Claude",
        category: ProviderCategory::Text,
        default_endpoint: "https://api.anthropic.com",
        default_model: "claude-3-5-sonnet-20241022",
        auth: AuthScheme::XApiKey,
        key_prefix_hint: Some("sk-ant-"),
        requires_api_key: true,
    },
    // Image providers.
    ProviderDescriptor {
        id: "openai_dalle",
        name: "OpenAI DALL-E",
        category: ProviderCategory::Image,
        default_endpoint: "https://api.openai.com/v1",
        default_model: "dall-e-3",
        auth: AuthScheme::Bearer,
        key_prefix_hint: Some("sk-"),
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "stability",
        name: "Stability AI",
        category: ProviderCategory::Image,
        default_endpoint: "https://api.stability.ai",
        default_model: "stable-diffusion-xl-1024-v1-0",
        auth: AuthScheme::Bearer,
        key_prefix_hint: Some("sk-"),
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "hunyuan_image",
        name: "Tencent Hunyuan Images",
        category: ProviderCategory::Image,
        default_endpoint: "https://api.hunyuan.cloud.tencent.com/v1",
        default_model: "hunyuan-image",
        auth: AuthScheme::Bearer,
        key_prefix_hint: None,
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "dmxapi",
        name: "DMXAPI",
        category: ProviderCategory::Image,
        default_endpoint: "https://www.dmxapi.com/v1",
        default_model: "seedream-3.0",
        auth: AuthScheme::Bearer,
        key_prefix_hint: Some("sk-"),
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "b3n",
        name: "B3N AI",
        category: ProviderCategory::Image,
        default_endpoint: "https://api.b3n.fun/v1",
        default_model: "dall-e-3",
        auth: AuthScheme::RawAuthorization,
        key_prefix_hint: None,
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "wavespeed",
        name: "WaveSpeed AI",
        category: ProviderCategory::Image,
        default_endpoint: "https://api.wavespeed.ai",
        default_model: "hidream-i1-full",
        auth: AuthScheme::Bearer,
        key_prefix_hint: None,
        requires_api_key: true,
    },
    ProviderDescriptor {
        id: "pollinations",
        name: "Pollinations.AI",
        category: ProviderCategory::Image,
        default_endpoint: "https://image.pollinations.ai",
        default_model: "flux",
        auth: AuthScheme::None,
        key_prefix_hint: None,
        requires_api_key: false,
    },
];

/// Look up a descriptor by provider id.
pub fn descriptor(id: &str) -> Option<&'static ProviderDescriptor> {
    PROVIDERS.iter().find(|p| p.id == id)
}

/// Human-readable provider name; falls back to the raw id for unknown
/// providers so error messages stay usable.
pub fn display_name(id: &str) -> &str {
    descriptor(id).map_or(id, |p| p.name)
}

/// Whether an adapter is registered for this id at all.
pub fn is_supported(id: &str) -> bool {
    descriptor(id).is_some()
}

/// Advisory key-format check. Returns a hint message when the key does not
/// match the provider's known prefix. Providers change key formats over
/// time, so a mismatch must never block saving a credential.
pub fn key_format_hint(id: &str, api_key: &str) -> Option<String> {
    let desc = descriptor(id)?;
    let prefix = desc.key_prefix_hint?;
    if api_key.starts_with(prefix) {
        None
    } else {
        Some(format!(
            "{} keys usually start with \"{prefix}\"; double-check the key if calls fail",
            desc.name
        ))
    }
}
