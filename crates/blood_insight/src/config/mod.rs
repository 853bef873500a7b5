//! Configuration module for blood_insight
//!
//! This module contains:
//! - `insight`: Endpoints and fallback credential
//! - `models`: Supported model identifiers
//! - `prompts`: The fixed analysis prompt

mod insight;
mod models;
mod prompts;

pub use insight::{
    InsightConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_OPENAI_BASE_URL, GEMINI_KEY_ENV,
};
pub use models::{list_supported_models, ProviderKind, SupportedModel, GEMINI_REMOTE_MODEL};
pub use prompts::{build_prompt, is_no_result, NO_RESULT_SENTINEL};
