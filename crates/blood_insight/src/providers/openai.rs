//! OpenAI chat-completions client

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessageContentPartImage, ChatCompletionRequestMessageContentPartText,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ImageDetail, ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{mentions_invalid_key, InsightProvider};
use crate::config::ProviderKind;
use crate::error::{InsightError, Result};
use crate::upload::EncodedImage;

/// Backoff policy that gives up on the first failure
fn no_retry_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        max_elapsed_time: Some(Duration::ZERO),
        ..Default::default()
    }
}

/// Client for OpenAI-compatible vision chat models
pub struct OpenAiProvider {
    model: String,
    client: Client<OpenAIConfig>,
}

impl OpenAiProvider {
    /// Create a client that sends each request exactly once
    ///
    /// # Arguments
    /// * `base_url` - API base URL, e.g. `https://api.openai.com/v1`
    /// * `model` - Remote model name
    /// * `api_key` - Bearer token sent with the request
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key(api_key);

        Self {
            model: model.into(),
            client: Client::with_config(openai_config).with_backoff(no_retry_backoff()),
        }
    }

    /// One user message: the prompt text block, then the image as a data URI
    fn build_request(
        &self,
        image: &EncodedImage,
        prompt: &str,
    ) -> std::result::Result<CreateChatCompletionRequest, OpenAIError> {
        let content_parts = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: prompt.to_string(),
                },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: image.data_uri(),
                        detail: Some(ImageDetail::Auto),
                    },
                },
            ),
        ];

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()?;

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .build()
    }

    fn extract_text(response: &CreateChatCompletionResponse) -> Option<String> {
        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
    }

    fn classify_error(err: OpenAIError) -> InsightError {
        match err {
            OpenAIError::ApiError(api) => {
                let code_rejects_key = api.code.as_deref() == Some("invalid_api_key");
                if code_rejects_key || mentions_invalid_key(&api.message) {
                    InsightError::InvalidCredential
                } else {
                    InsightError::failed(format!(
                        "OpenAI API error ({}): {}",
                        api.r#type.unwrap_or_default(),
                        api.message
                    ))
                }
            }
            other => InsightError::failed(format!("OpenAI request failed: {}", other)),
        }
    }
}

#[async_trait]
impl InsightProvider for OpenAiProvider {
    async fn analyze(&self, image: &EncodedImage, prompt: &str) -> Result<String> {
        let request = self
            .build_request(image, prompt)
            .map_err(|e| InsightError::failed(format!("Invalid OpenAI request: {}", e)))?;

        info!("Sending request to OpenAI with model: {}", self.model);
        debug!("Image data URI: {} base64 chars ({})", image.data.len(), image.mime_type);

        let response = self.client.chat().create(request).await.map_err(|e| {
            error!("OpenAI API error: {}", e);
            Self::classify_error(e)
        })?;

        Self::extract_text(&response).ok_or_else(|| {
            error!("OpenAI returned no message content");
            InsightError::failed("OpenAI returned no message content")
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::stub_server::StubServer;
    use async_openai::error::ApiError;
    use serde_json::json;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new("http://localhost:8000/v1", "gpt-4o", "test-key")
    }

    fn api_error(message: &str, code: Option<&str>) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: message.to_string(),
            r#type: Some("invalid_request_error".to_string()),
            param: None,
            code: code.map(str::to_string),
        })
    }

    #[test]
    fn test_request_shape() {
        let image = EncodedImage {
            data: "aGVsbG8=".to_string(),
            mime_type: "image/png".to_string(),
        };
        let request = provider().build_request(&image, "Analyze this").unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], json!("gpt-4o"));
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], json!("user"));

        let content = messages[0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], json!("text"));
        assert_eq!(content[0]["text"], json!("Analyze this"));
        assert_eq!(content[1]["type"], json!("image_url"));
        assert_eq!(
            content[1]["image_url"]["url"],
            json!("data:image/png;base64,aGVsbG8=")
        );
    }

    #[test]
    fn test_extract_text() {
        let response: CreateChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "All values are within range."},
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        assert_eq!(
            OpenAiProvider::extract_text(&response).as_deref(),
            Some("All values are within range.")
        );
    }

    #[test]
    fn test_extract_text_missing_content() {
        let response: CreateChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-2",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-4o",
            "choices": []
        }))
        .unwrap();

        assert!(OpenAiProvider::extract_text(&response).is_none());
    }

    #[test]
    fn test_classify_invalid_key() {
        let err = api_error(
            "Incorrect API key provided: sk-abc. You can find your API key at https://platform.openai.com/account/api-keys.",
            Some("invalid_api_key"),
        );
        assert!(matches!(
            OpenAiProvider::classify_error(err),
            InsightError::InvalidCredential
        ));
    }

    #[test]
    fn test_classify_rate_limit_is_generic() {
        let err = api_error("Rate limit reached for gpt-4o", Some("rate_limit_exceeded"));
        assert!(matches!(
            OpenAiProvider::classify_error(err),
            InsightError::AnalysisFailed { .. }
        ));

        let err = OpenAIError::InvalidArgument("bad".to_string());
        assert!(matches!(
            OpenAiProvider::classify_error(err),
            InsightError::AnalysisFailed { .. }
        ));
    }

    fn sample_image() -> EncodedImage {
        EncodedImage {
            data: "aGVsbG8=".to_string(),
            mime_type: "image/png".to_string(),
        }
    }

    fn openai_for(server: &StubServer) -> OpenAiProvider {
        OpenAiProvider::new(server.url("/v1"), "gpt-4o", "test-key")
    }

    fn completion_body(content: Option<&str>) -> String {
        let choices = match content {
            Some(text) => json!([{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }]),
            None => json!([]),
        };
        json!({
            "id": "chatcmpl-3",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-4o",
            "choices": choices
        })
        .to_string()
    }

    fn error_body(message: &str, kind: &str, code: &str) -> String {
        json!({
            "error": {"message": message, "type": kind, "param": null, "code": code}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_analyze_returns_first_choice() {
        let server = StubServer::start(200, &completion_body(Some("Results look healthy."))).await;

        let text = openai_for(&server)
            .analyze(&sample_image(), "Analyze this")
            .await
            .unwrap();

        assert_eq!(text, "Results look healthy.");
        assert_eq!(server.hits(), 1);
        let request = &server.requests()[0];
        assert!(request.starts_with("POST /v1/chat/completions "));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer test-key"));
        assert!(request.contains("data:image/png;base64,aGVsbG8="));
    }

    #[tokio::test]
    async fn test_analyze_without_choices_fails() {
        let server = StubServer::start(200, &completion_body(None)).await;

        let err = openai_for(&server)
            .analyze(&sample_image(), "Analyze this")
            .await
            .unwrap_err();

        assert!(matches!(err, InsightError::AnalysisFailed { .. }));
    }

    #[tokio::test]
    async fn test_analyze_rejected_key() {
        let body = error_body(
            "Incorrect API key provided: test-key.",
            "invalid_request_error",
            "invalid_api_key",
        );
        let server = StubServer::start(401, &body).await;

        let err = openai_for(&server)
            .analyze(&sample_image(), "Analyze this")
            .await
            .unwrap_err();

        assert!(matches!(err, InsightError::InvalidCredential));
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_analyze_rate_limited_sends_once() {
        let body = error_body(
            "Rate limit reached for gpt-4o",
            "requests",
            "rate_limit_exceeded",
        );
        let server = StubServer::start(429, &body).await;

        let err = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            openai_for(&server).analyze(&sample_image(), "Analyze this"),
        )
        .await
        .expect("request should not be retried")
        .unwrap_err();

        assert!(matches!(err, InsightError::AnalysisFailed { .. }));
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_analyze_server_error_is_generic() {
        let server = StubServer::start(500, "upstream failure").await;

        let err = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            openai_for(&server).analyze(&sample_image(), "Analyze this"),
        )
        .await
        .expect("request should not be retried")
        .unwrap_err();

        assert!(matches!(err, InsightError::AnalysisFailed { .. }));
        assert_eq!(server.hits(), 1);
    }
}
