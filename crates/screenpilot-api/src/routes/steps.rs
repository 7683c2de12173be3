use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use screenpilot_core::StepRequest;
use screenpilot_types::ParsedStep;
use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStepsRequest {
    #[serde(default)]
    pub goal_title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StepBody {
    pub title: String,
    pub description: String,
}

impl From<ParsedStep> for StepBody {
    fn from(step: ParsedStep) -> Self {
        Self {
            title: step.title,
            description: step.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StepsResponse {
    pub steps: Vec<StepBody>,
    /// Set when the fallback list was substituted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Break a goal into ordered steps
///
/// Model or parse failures still return 200 with a generic step list and an
/// `error` field.
#[utoipa::path(
    post,
    path = "/generate-steps",
    request_body = GenerateStepsRequest,
    responses(
        (status = 200, description = "Generated or fallback steps", body = StepsResponse),
        (status = 400, description = "Missing goal title", body = crate::error::ErrorResponse)
    ),
    tag = "goals"
)]
pub async fn generate_steps(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateStepsRequest>, JsonRejection>,
) -> ApiResult<Json<StepsResponse>> {
    let Json(req) = payload?;
    let request = StepRequest::new(req.goal_title, req.description)?;

    let response = match state.assistant.generate_steps(request).await {
        Ok(steps) => StepsResponse {
            steps: steps.into_iter().map(Into::into).collect(),
            error: None,
        },
        Err(fallback) => StepsResponse {
            error: Some(fallback.message()),
            steps: fallback.steps.into_iter().map(Into::into).collect(),
        },
    };

    Ok(Json(response))
}
