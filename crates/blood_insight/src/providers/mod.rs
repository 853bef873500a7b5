//! Provider back ends
//!
//! This module provides:
//! - `gemini`: Gemini generate-content client
//! - `openai`: OpenAI chat-completions client
//!
//! Both implement [`InsightProvider`]. The dispatcher obtains them through a
//! [`ProviderFactory`] so that tests can substitute their own.

mod gemini;
mod openai;
#[cfg(test)]
mod stub_server;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{InsightConfig, ProviderKind, SupportedModel};
use crate::error::Result;
use crate::upload::EncodedImage;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

/// A multimodal model that turns an image and a prompt into text
#[async_trait]
pub trait InsightProvider: Send + Sync {
    /// Send one request and return the first textual completion.
    ///
    /// Empty or missing text is an error, never an empty `Ok`.
    async fn analyze(&self, image: &EncodedImage, prompt: &str) -> Result<String>;

    fn kind(&self) -> ProviderKind;
}

/// Builds a provider for a model and credential
pub trait ProviderFactory: Send + Sync {
    fn create(&self, model: SupportedModel, api_key: &str) -> Box<dyn InsightProvider>;
}

/// Factory producing the real HTTP clients
#[derive(Debug, Clone, Default)]
pub struct HttpProviderFactory {
    config: InsightConfig,
}

impl HttpProviderFactory {
    pub fn new(config: InsightConfig) -> Self {
        Self { config }
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn create(&self, model: SupportedModel, api_key: &str) -> Box<dyn InsightProvider> {
        match model.provider() {
            ProviderKind::Gemini => Box::new(GeminiProvider::new(
                &self.config.gemini_base_url,
                model.remote_name(),
                api_key,
            )),
            ProviderKind::OpenAi => Box::new(OpenAiProvider::new(
                &self.config.openai_base_url,
                model.remote_name(),
                api_key,
            )),
        }
    }
}

lazy_static! {
    static ref INVALID_KEY_PATTERN: Regex = Regex::new(
        r"(?i)(api[ _-]?key not valid|api_key_invalid|invalid[ _-]api[ _-]key|incorrect api key)"
    )
    .expect("invalid key pattern");
}

/// True when a provider error message says the key itself was rejected
pub(crate) fn mentions_invalid_key(message: &str) -> bool {
    INVALID_KEY_PATTERN.is_match(message)
}
