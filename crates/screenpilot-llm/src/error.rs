use thiserror::Error;

/// Classified failure of an upstream model call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Model request timed out: {0}")]
    Timeout(String),

    #[error("Upstream authentication failed: {0}")]
    UpstreamAuth(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl ModelError {
    /// Classify a failure from its message alone.
    ///
    /// Timeout wording wins over everything else; SDK-name or API-key wording
    /// means misconfiguration; anything else is treated as transient.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("timeout") || lower.contains("timed out") {
            ModelError::Timeout(message)
        } else if message.contains("GoogleGenerativeAI") || message.contains("API key") {
            ModelError::UpstreamAuth(message)
        } else {
            ModelError::UpstreamUnavailable(message)
        }
    }

    /// Classify a non-success HTTP response
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = format!("Gemini API error ({}): {}", status, body);
        match status {
            401 | 403 => ModelError::UpstreamAuth(message),
            408 | 504 => ModelError::Timeout(message),
            _ => ModelError::classify(message),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ModelError::Timeout(_))
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::Timeout(err.to_string())
        } else {
            ModelError::classify(err.to_string())
        }
    }
}
