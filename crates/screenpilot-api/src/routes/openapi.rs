use axum::Json;
use utoipa::OpenApi;

use super::{analyze, health, models, steps};
use crate::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        analyze::analyze,
        steps::generate_steps,
        models::list_models,
        health::health_check,
    ),
    components(schemas(
        analyze::AnalyzeRequest,
        analyze::AnalyzeResponse,
        analyze::GoalBody,
        analyze::HistoryBody,
        steps::GenerateStepsRequest,
        steps::StepsResponse,
        steps::StepBody,
        models::ListModelsResponse,
        health::HealthResponse,
        ErrorResponse,
    )),
    tags(
        (name = "analysis", description = "Screenshot questions"),
        (name = "goals", description = "Goal step generation"),
        (name = "diagnostics", description = "Provider diagnostics"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Serve the generated OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
