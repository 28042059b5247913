use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
use crate::ai::VisionService;
use crate::models::{Config, ImageInput};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct GeminiVisionClient {
    http: GeminiHttpClient,
}

impl GeminiVisionClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, None, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Option<Duration>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, timeout, client),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new_with_client(
            config.api_key.clone(),
            config.model.clone(),
            config.timeout,
            reqwest::Client::new(),
        )
        .with_base_url(config.base_url.clone())
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn build_request(input: &ImageInput) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: input.mime_type.clone(),
                            data: input.base64_data(),
                        },
                    },
                    Part::Text {
                        text: input.prompt.clone(),
                    },
                ],
            }],
        }
    }

    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!(" (prompt blocked: {})", r))
                .unwrap_or_default();
            return Err(Error::MalformedResponse(format!(
                "No candidates in Gemini response{}",
                reason
            )));
        };

        let finish_reason = candidate.finish_reason;
        candidate
            .content
            .and_then(|content| {
                content.parts.into_iter().find_map(|p| match p {
                    Part::Text { text } => Some(text),
                    _ => None,
                })
            })
            .ok_or_else(|| {
                Error::MalformedResponse(format!(
                    "No text in first Gemini candidate (finish reason: {})",
                    finish_reason.as_deref().unwrap_or("unknown")
                ))
            })
    }
}

#[async_trait]
impl VisionService for GeminiVisionClient {
    async fn describe_image(&self, input: &ImageInput) -> Result<String> {
        tracing::debug!(
            "Describing image ({} bytes, {}) via Gemini model {}",
            input.bytes.len(),
            input.mime_type,
            self.http.model()
        );

        let request = Self::build_request(input);
        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        Self::extract_text(response)
    }
}
