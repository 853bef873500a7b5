//! Gemini generate-content client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{mentions_invalid_key, InsightProvider};
use crate::config::ProviderKind;
use crate::error::{InsightError, Result};
use crate::upload::EncodedImage;

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

/// Client for the Gemini `generateContent` endpoint
pub struct GeminiProvider {
    base_url: String,
    model: String,
    api_key: String,
    http: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new GeminiProvider
    ///
    /// # Arguments
    /// * `base_url` - API base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`
    /// * `model` - Remote model name, with or without the `models/` prefix
    /// * `api_key` - Key sent as the `key` query parameter
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.base_url, model_path)
    }

    /// Prompt text followed by the inline image, in a single user turn
    fn build_request(image: &EncodedImage, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![
                    RequestPart::Text {
                        text: prompt.to_string(),
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        },
                    },
                ],
            }],
        }
    }

    /// Joined text parts of the first candidate, if any
    fn extract_text(response: &GenerateContentResponse) -> Option<String> {
        let candidate = response.candidates.first()?;
        let text: String = candidate
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn classify_error(status: u16, body: &str) -> InsightError {
        let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();

        let key_rejected = match &parsed {
            Some(envelope) => {
                mentions_invalid_key(&envelope.error.message)
                    || envelope
                        .error
                        .details
                        .iter()
                        .any(|detail| mentions_invalid_key(&detail.to_string()))
            }
            None => mentions_invalid_key(body),
        };

        if key_rejected || status == 401 || status == 403 {
            return InsightError::InvalidCredential;
        }

        let reason = match parsed {
            Some(envelope) => format!(
                "Gemini API error ({} {}): {}",
                status,
                envelope.error.status.unwrap_or_default(),
                envelope.error.message
            ),
            None => format!("Gemini API error ({}): {}", status, body),
        };
        InsightError::failed(reason)
    }
}

#[async_trait]
impl InsightProvider for GeminiProvider {
    async fn analyze(&self, image: &EncodedImage, prompt: &str) -> Result<String> {
        let request = Self::build_request(image, prompt);

        info!("Sending request to Gemini with model: {}", self.model);
        debug!("Inline data: {} base64 chars ({})", image.data.len(), image.mime_type);

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!("Gemini request failed: {}", e);
                InsightError::failed(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        debug!("Gemini response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| InsightError::failed(format!("Gemini response unreadable: {}", e)))?;

        if !status.is_success() {
            let err = Self::classify_error(status.as_u16(), &body);
            error!("Gemini API error response ({}): {}", status, body);
            return Err(err);
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| InsightError::failed(format!("Malformed Gemini response: {}", e)))?;

        Self::extract_text(&parsed).ok_or_else(|| {
            let reason = parsed
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            error!("Gemini returned no text ({})", reason);
            InsightError::failed(format!("Gemini returned no text ({})", reason))
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }
}
