use crate::error::ModelError;
use async_trait::async_trait;

/// Trait for single-shot generative calls (text, optionally with one image)
///
/// Implementations perform no retries; a failure is classified once and
/// returned to the caller.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Generate text for the given instruction
    async fn generate(&self, request: GenerateRequest) -> Result<String, ModelError>;

    /// Raw model listing from the provider (diagnostics only)
    async fn list_models(&self) -> Result<serde_json::Value, ModelError>;
}

/// Binary image attached inline to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub image: Option<InlineImage>,
    /// Let the model run a live web search before answering
    pub search_grounding: bool,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            image: None,
            search_grounding: false,
        }
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_search_grounding(mut self, enabled: bool) -> Self {
        self.search_grounding = enabled;
        self
    }
}
