// Gemini-specific client implementation

use crate::config::GeminiConfig;
use crate::error::ModelError;
use crate::gemini::types::{
    Content, GeminiError, GenerateContentRequest, GenerateContentResponse, GoogleSearch,
    InlineData, Part, Tool,
};
use crate::traits::{GenerateRequest, GenerativeClient};
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client (HTTP direct, no SDK)
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Create new client from provider configuration
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut key = HeaderValue::from_str(&config.api_key).context("Invalid API key format")?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url().to_string(),
        })
    }

    /// Build generateContent payload: instruction text first, then the image if any
    pub fn build_request(&self, request: &GenerateRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::Text {
            text: request.prompt.clone(),
        }];

        if let Some(image) = &request.image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                },
            });
        }

        let tools = if request.search_grounding {
            vec![Tool {
                google_search: GoogleSearch::default(),
            }]
        } else {
            Vec::new()
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            tools,
        }
    }

    async fn error_from_response(response: reqwest::Response) -> ModelError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<GeminiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        ModelError::from_status(status, &message)
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String, ModelError> {
        let payload = self.build_request(&request);

        tracing::debug!(
            model = %request.model,
            has_image = request.image.is_some(),
            search_grounding = request.search_grounding,
            "Calling Gemini generateContent"
        );

        let response = self
            .http_client
            .post(format!("{}/models/{}:generateContent", self.base_url, request.model))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let raw: GenerateContentResponse = response.json().await?;

        raw.text().ok_or_else(|| {
            let finish_reason = raw
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "none".to_string());
            ModelError::UpstreamUnavailable(format!(
                "Gemini returned no text (finish reason: {})",
                finish_reason
            ))
        })
    }

    async fn list_models(&self) -> Result<serde_json::Value, ModelError> {
        let response = self
            .http_client
            .get(format!("{}/models", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::InlineImage;

    fn client() -> GeminiClient {
        GeminiClient::new(GeminiConfig::new("test-key")).unwrap()
    }

    #[test]
    fn test_build_request_text_only() {
        let request = GenerateRequest::new("gemini-2.5-flash", "List the steps");
        let payload = client().build_request(&request);

        assert_eq!(payload.contents.len(), 1);
        assert_eq!(payload.contents[0].parts.len(), 1);
        assert!(payload.tools.is_empty());
    }

    #[test]
    fn test_build_request_with_image_and_grounding() {
        let request = GenerateRequest::new("gemini-2.5-flash", "What is this?")
            .with_image(InlineImage::new("image/png", vec![0, 0, 0]))
            .with_search_grounding(true);
        let payload = client().build_request(&request);

        let parts = &payload.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert!(matches!(&parts[0], Part::Text { text } if text == "What is this?"));
        match &parts[1] {
            Part::InlineData { inline_data } => {
                assert_eq!(inline_data.mime_type, "image/png");
                assert_eq!(inline_data.data, "AAAA");
            }
            other => panic!("expected inline data, got {:?}", other),
        }
        assert_eq!(payload.tools.len(), 1);
    }

    #[test]
    fn test_invalid_api_key_rejected() {
        let result = GeminiClient::new(GeminiConfig::new("bad\nkey"));
        assert!(result.is_err());
    }
}
