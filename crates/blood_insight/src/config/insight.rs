//! Dispatcher configuration

use std::env;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the fallback Gemini key
pub const GEMINI_KEY_ENV: &str = "BLOOD_INSIGHT_GEMINI_KEY";

/// Endpoints and the fallback credential used when no user key is stored
#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub gemini_base_url: String,
    pub openai_base_url: String,
    pub fallback_gemini_key: Option<String>,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            fallback_gemini_key: None,
        }
    }
}

impl InsightConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default endpoints, with the fallback key and base URL overrides
    /// taken from the process environment
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            gemini_base_url: env::var("BLOOD_INSIGHT_GEMINI_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.gemini_base_url),
            openai_base_url: env::var("BLOOD_INSIGHT_OPENAI_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.openai_base_url),
            fallback_gemini_key: env::var(GEMINI_KEY_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }

    /// Set the fallback Gemini key. Blank keys count as absent.
    pub fn with_fallback_gemini_key(mut self, key: Option<impl Into<String>>) -> Self {
        self.fallback_gemini_key = key.map(Into::into).filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.gemini_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.openai_base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}
