use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use screenpilot_core::{AssistError, ModelError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::headers::quota_headers;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Assist(#[from] AssistError),

    #[error("無効なリクエストです: {0}")]
    InvalidBody(#[from] JsonRejection),
}

const INTERNAL_ERROR_MESSAGE: &str =
    "サーバーエラーが発生しました。しばらくしてから再試行してください。";

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        ApiError::Assist(err.into())
    }
}

/// Body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Assist(AssistError::RateLimited { quota, .. }) => {
                let body = Json(json!({ "error": self.to_string() }));
                return (StatusCode::TOO_MANY_REQUESTS, quota_headers(quota), body).into_response();
            }
            ApiError::Assist(err) if err.is_validation() => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Assist(AssistError::Timeout) => {
                tracing::error!("Model call timed out");
                (StatusCode::GATEWAY_TIMEOUT, self.to_string())
            }
            ApiError::Assist(err) if err.is_upstream() => {
                tracing::error!("Upstream error: {}", err.detail());
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            ApiError::InvalidBody(rejection) => {
                // Keep 413/415 so clients can tell size and content-type problems apart
                let status = rejection.status();
                let status = if status == StatusCode::PAYLOAD_TOO_LARGE
                    || status == StatusCode::UNSUPPORTED_MEDIA_TYPE
                {
                    status
                } else {
                    StatusCode::BAD_REQUEST
                };
                (status, self.to_string())
            }
            ApiError::Assist(err) => {
                tracing::error!("Internal error: {}", err.detail());
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use screenpilot_core::{Quota, RateLimitViolation};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AssistError::MissingInput, StatusCode::BAD_REQUEST),
            (AssistError::QuestionTooLong, StatusCode::BAD_REQUEST),
            (AssistError::ImageTooLarge, StatusCode::BAD_REQUEST),
            (AssistError::InvalidImageFormat, StatusCode::BAD_REQUEST),
            (AssistError::MissingGoalTitle, StatusCode::BAD_REQUEST),
            (AssistError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (AssistError::UpstreamAuth("key".into()), StatusCode::BAD_GATEWAY),
            (AssistError::UpstreamUnavailable("503".into()), StatusCode::BAD_GATEWAY),
            (AssistError::MalformedStepData("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_rate_limited_carries_headers() {
        let err = ApiError::from(AssistError::RateLimited {
            violation: RateLimitViolation::DailyCap { daily_limit: 50 },
            quota: Quota {
                remaining: 0,
                reset_at: chrono::DateTime::from_timestamp_millis(1_700_000_000_000),
            },
        });
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
        assert_eq!(response.headers()["x-ratelimit-reset"], "1700000000000");
    }

    #[tokio::test]
    async fn test_internal_error_body_is_localized() {
        let response = ApiError::from(AssistError::MalformedStepData("x".into())).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_model_error_conversion() {
        let err = ApiError::from(ModelError::UpstreamAuth("API key not valid".into()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
