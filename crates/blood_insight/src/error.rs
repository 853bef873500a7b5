/// Error types for insight dispatch
use std::path::PathBuf;
use thiserror::Error;

/// Message shown when a provider rejects the credential itself.
pub const INVALID_KEY_MESSAGE: &str = "API key not valid. Please pass a valid API key.";

/// Message shown for every other provider or network failure.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze blood test results";

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("Unsupported model selected: {0}")]
    UnsupportedModel(String),

    #[error("No API key available")]
    NoCredential,

    #[error("{}", INVALID_KEY_MESSAGE)]
    InvalidCredential,

    /// Generic provider failure. The reason is kept for logging only.
    #[error("{}", ANALYSIS_FAILED_MESSAGE)]
    AnalysisFailed { reason: String },

    #[error("Failed to read {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type: {}", .0.display())]
    UnsupportedFileType(PathBuf),

    #[error("Settings IO error: {0}")]
    SettingsIo(#[from] std::io::Error),

    #[error("Settings JSON error: {0}")]
    SettingsJson(#[from] serde_json::Error),
}

impl InsightError {
    pub(crate) fn failed(reason: impl Into<String>) -> Self {
        Self::AnalysisFailed {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InsightError>;
