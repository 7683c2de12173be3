use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListModelsResponse {
    pub success: bool,
    /// Model descriptors exactly as the provider returns them
    #[schema(value_type = Vec<Object>)]
    pub models: Vec<Value>,
}

/// List models visible to the configured API key
#[utoipa::path(
    get,
    path = "/list-models",
    responses(
        (status = 200, description = "Provider model list", body = ListModelsResponse),
        (status = 502, description = "Provider unreachable", body = crate::error::ErrorResponse)
    ),
    tag = "diagnostics"
)]
pub async fn list_models(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ListModelsResponse>> {
    let listing = state.assistant.client().list_models().await?;

    let models = match listing.get("models") {
        Some(Value::Array(models)) => models.clone(),
        _ => Vec::new(),
    };

    tracing::debug!(count = models.len(), "Listed models");

    Ok(Json(ListModelsResponse {
        success: true,
        models,
    }))
}
