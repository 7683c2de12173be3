use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use screenpilot_types::{AnalysisRequest, GoalContext, HistoryEntry};
use crate::{
    error::ApiResult,
    headers::{client_identifier, quota_headers},
    state::AppState,
};

/// `null` and absent fields are treated as empty so that the input checks,
/// not the JSON extractor, report them.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Screenshot as a `data:<mime>;base64,<payload>` URI
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub goal: Option<GoalBody>,
    /// Prior exchanges, oldest first
    #[serde(default)]
    pub history: Option<Vec<HistoryBody>>,
}

/// Any goal object counts as present, even with missing fields
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalBody {
    pub objective: String,
    pub current_status: String,
    pub deadline: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct HistoryBody {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeResponse {
    pub response: String,
    pub remaining: u32,
}

impl From<GoalBody> for GoalContext {
    fn from(body: GoalBody) -> Self {
        Self {
            objective: body.objective,
            current_status: body.current_status,
            deadline: body.deadline,
        }
    }
}

impl From<HistoryBody> for HistoryEntry {
    fn from(body: HistoryBody) -> Self {
        HistoryEntry::new(body.question, body.answer)
    }
}

impl From<AnalyzeRequest> for AnalysisRequest {
    fn from(req: AnalyzeRequest) -> Self {
        Self {
            image_data_uri: req.image.unwrap_or_default(),
            question: req.question.unwrap_or_default(),
            goal: req.goal.map(Into::into),
            history: req
                .history
                .map(|entries| entries.into_iter().map(Into::into).collect()),
        }
    }
}

/// Answer a question about a screenshot
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Model answer", body = AnalyzeResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 429, description = "Rate limited", body = crate::error::ErrorResponse),
        (status = 502, description = "Provider unreachable", body = crate::error::ErrorResponse),
        (status = 504, description = "Model provider too slow", body = crate::error::ErrorResponse)
    ),
    tag = "analysis"
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<([(HeaderName, HeaderValue); 2], Json<AnalyzeResponse>)> {
    // 1. Rate limit, counted even when the body turns out to be unusable
    let identifier = client_identifier(&headers);
    let quota = state.assistant.check_quota(&identifier)?;

    // 2. Parse body
    let Json(req) = payload?;

    // 3. Run the assistant (validation, model call)
    let analysis = state.assistant.analyze_with_quota(quota, req.into()).await?;

    Ok((
        quota_headers(&analysis.quota),
        Json(AnalyzeResponse {
            response: analysis.response,
            remaining: analysis.quota.remaining,
        }),
    ))
}
