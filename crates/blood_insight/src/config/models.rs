//! Supported model identifiers and their provider back ends

use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote model used for the Gemini back end
pub const GEMINI_REMOTE_MODEL: &str = "gemini-1.5-flash";

/// Provider back end families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Google Gemini generate-content API
    Gemini,
    /// OpenAI chat completions API
    OpenAi,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => f.write_str("Gemini"),
            Self::OpenAi => f.write_str("OpenAI"),
        }
    }
}

/// Models that can be selected in the settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportedModel {
    Gpt4o,
    Gpt4Turbo,
    Gemini,
}

static SUPPORTED_MODELS: phf::Map<&'static str, SupportedModel> = phf_map! {
    "gpt-4o" => SupportedModel::Gpt4o,
    "gpt-4-turbo" => SupportedModel::Gpt4Turbo,
    "gemini" => SupportedModel::Gemini,
};

impl SupportedModel {
    /// All models, in menu order
    pub const ALL: [SupportedModel; 3] = [Self::Gpt4o, Self::Gpt4Turbo, Self::Gemini];

    /// Look up a stored model identifier. Matching is exact.
    pub fn from_id(id: &str) -> Option<Self> {
        SUPPORTED_MODELS.get(id).copied()
    }

    /// Identifier as stored in the settings record
    pub fn id(&self) -> &'static str {
        match self {
            Self::Gpt4o => "gpt-4o",
            Self::Gpt4Turbo => "gpt-4-turbo",
            Self::Gemini => "gemini",
        }
    }

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gpt4o => "GPT-4o",
            Self::Gpt4Turbo => "GPT-4 Turbo",
            Self::Gemini => "Gemini",
        }
    }

    pub fn provider(&self) -> ProviderKind {
        match self {
            Self::Gpt4o | Self::Gpt4Turbo => ProviderKind::OpenAi,
            Self::Gemini => ProviderKind::Gemini,
        }
    }

    /// Model name sent to the provider API
    pub fn remote_name(&self) -> &'static str {
        match self {
            Self::Gemini => GEMINI_REMOTE_MODEL,
            other => other.id(),
        }
    }
}

/// List supported model identifiers
pub fn list_supported_models() -> Vec<&'static str> {
    SupportedModel::ALL.iter().map(|m| m.id()).collect()
}
