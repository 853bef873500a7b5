//! blood_insight: AI analysis of blood test report images
//!
//! This library provides:
//! - A settings store for the user's model choice and API key
//! - Gemini and OpenAI multimodal provider clients
//! - A dispatcher that picks a provider, encodes the report and sends one request
//! - Markdown rendering and report saving helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use blood_insight::{FileSettingsStore, ImageInput, InsightConfig, InsightDispatcher};
//!
//! #[tokio::main]
//! async fn main() -> blood_insight::Result<()> {
//!     let store = Arc::new(FileSettingsStore::default());
//!     let dispatcher = InsightDispatcher::new(store, InsightConfig::from_env());
//!
//!     let image = ImageInput::from_path("panel.png").await?;
//!     let text = dispatcher.generate_insights(image, "Fasting sample").await?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

pub mod error;

pub mod config;

pub mod dispatcher;
pub mod providers;
pub mod render;
pub mod report_saver;
pub mod settings;
pub mod upload;

pub use error::{InsightError, Result, ANALYSIS_FAILED_MESSAGE, INVALID_KEY_MESSAGE};

pub use config::{
    build_prompt, is_no_result, list_supported_models, InsightConfig, ProviderKind,
    SupportedModel, DEFAULT_GEMINI_BASE_URL, DEFAULT_OPENAI_BASE_URL, GEMINI_KEY_ENV,
    NO_RESULT_SENTINEL,
};

pub use dispatcher::{CredentialSource, InsightDispatcher, Route};

pub use providers::{
    GeminiProvider, HttpProviderFactory, InsightProvider, OpenAiProvider, ProviderFactory,
};

pub use report_saver::ReportSaver;

pub use settings::{FileSettingsStore, MemorySettingsStore, Settings, SettingsStore};

pub use upload::{EncodedImage, ImageInput};
