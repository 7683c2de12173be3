use screenpilot_llm::ModelError;
use thiserror::Error;

use crate::rate_limit::{Quota, RateLimitViolation};

/// Every way a request can end without a model answer.
///
/// Display strings are the user-facing messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssistError {
    #[error("{}", .violation.message())]
    RateLimited {
        violation: RateLimitViolation,
        quota: Quota,
    },

    #[error("画像と質問の両方が必要です")]
    MissingInput,

    #[error("質問は500文字以内にしてください")]
    QuestionTooLong,

    #[error("画像は5MB以下にしてください")]
    ImageTooLarge,

    #[error("無効な画像形式です")]
    InvalidImageFormat,

    #[error("目標タイトルが必要です")]
    MissingGoalTitle,

    #[error("AIの応答時間が長すぎました。もう一度試してください。")]
    Timeout,

    #[error("AI APIに接続できませんでした。しばらくしてから再試行してください。")]
    UpstreamAuth(String),

    #[error("AIサービスが一時的に利用できません。しばらくしてから再試行してください。")]
    UpstreamUnavailable(String),

    #[error("Malformed step data: {0}")]
    MalformedStepData(String),
}

impl AssistError {
    /// Caller must correct the input before retrying
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AssistError::MissingInput
                | AssistError::QuestionTooLong
                | AssistError::ImageTooLarge
                | AssistError::InvalidImageFormat
                | AssistError::MissingGoalTitle
        )
    }

    /// Failure originated at the model provider
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AssistError::Timeout
                | AssistError::UpstreamAuth(_)
                | AssistError::UpstreamUnavailable(_)
        )
    }

    /// Message plus upstream detail, for logs and fallback reasons
    pub fn detail(&self) -> String {
        match self {
            AssistError::UpstreamAuth(detail) | AssistError::UpstreamUnavailable(detail) => {
                format!("{} ({})", self, detail)
            }
            _ => self.to_string(),
        }
    }
}

impl From<ModelError> for AssistError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Timeout(_) => AssistError::Timeout,
            ModelError::UpstreamAuth(detail) => AssistError::UpstreamAuth(detail),
            ModelError::UpstreamUnavailable(detail) => AssistError::UpstreamUnavailable(detail),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_mapping() {
        assert_eq!(AssistError::from(ModelError::Timeout("slow".into())), AssistError::Timeout);
        assert!(matches!(
            AssistError::from(ModelError::UpstreamAuth("bad key".into())),
            AssistError::UpstreamAuth(d) if d == "bad key"
        ));
        assert!(matches!(
            AssistError::from(ModelError::UpstreamUnavailable("503".into())),
            AssistError::UpstreamUnavailable(_)
        ));
    }

    #[test]
    fn test_categories() {
        assert!(AssistError::QuestionTooLong.is_validation());
        assert!(AssistError::InvalidImageFormat.is_validation());
        assert!(!AssistError::Timeout.is_validation());
        assert!(AssistError::Timeout.is_upstream());
        assert!(!AssistError::MalformedStepData("x".into()).is_upstream());
    }

    #[test]
    fn test_detail_includes_upstream_message() {
        let err = AssistError::UpstreamUnavailable("connection refused".into());
        assert!(err.detail().contains("connection refused"));
        assert_eq!(AssistError::MissingInput.detail(), "画像と質問の両方が必要です");
    }
}
