//! tripmuse
//!
//! Unified client layer for text and image generation across many
//! third-party providers (OpenAI, Claude, DeepSeek, SiliconFlow, Stability,
//! DALL-E, Tencent Hunyuan, WaveSpeed, Pollinations, ...). Each provider's
//! request/response shape is normalized behind one contract:
//!
//! - `generate_text` / `generate_image`: commands; return `Result` and
//!   classify every failure ([`GenError`]).
//! - `test_connection`: a query; always resolves with a
//!   [`ConnectionTestResult`], never an error.
//!
//! Credentials live in a [`store::CredentialStore`] over an injected storage
//! backend; endpoint/model resolution is layered (per-call override > stored
//! configuration > compiled-in default). Fallback between providers is a
//! caller decision: this crate reports the stored policy but never switches
//! providers on its own.
//!
//! ```no_run
//! use tripmuse::prelude::*;
//!
//! # async fn demo() -> Result<(), GenError> {
//! let client = Client::new()?;
//! client
//!     .store()
//!     .set(Category::Text, "deepseek", "sk-...", None, None)?;
//!
//! let report = client.test_configured(Category::Text).await;
//! assert!(report.success);
//!
//! let copy = client
//!     .generate_text_configured("three-day itinerary for Kyoto", &TextOptions::default())
//!     .await?;
//! println!("{copy}");
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod polling;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod store;
pub mod traits;
pub mod types;

pub use client::{Client, ClientBuilder};
pub use error::GenError;
pub use types::{Category, ConnectionTestResult, GenerationResult, ImageRef};

/// Common imports for downstream code.
pub mod prelude {
    pub use crate::client::{Client, ClientBuilder};
    pub use crate::config::{GlobalPolicy, resolve_endpoint};
    pub use crate::error::GenError;
    pub use crate::http::HttpSettings;
    pub use crate::provider::{ProviderCategory, ProviderDescriptor, display_name};
    pub use crate::store::{ApiCredential, CredentialStore, JsonFileBackend, MemoryBackend};
    pub use crate::traits::{ImageGeneration, TextGeneration};
    pub use crate::types::{
        Category, ConnectionTestResult, GenerationResult, ImageOptions, ImageRef, TextOptions,
    };
}
