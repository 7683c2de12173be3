pub mod config;
pub mod error;
pub mod headers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::routes::{analyze, health, models, openapi, steps};
use crate::state::AppState;

/// Request bodies carry a base64 screenshot; large enough that the 5 MB
/// image check is reached before the body limit.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Screenshot Q&A
        .route("/analyze", post(analyze::analyze))
        // Goals
        .route("/generate-steps", post(steps::generate_steps))
        // Diagnostics
        .route("/list-models", get(models::list_models))
        .route("/api/openapi.json", get(openapi::openapi_json));

    Router::new()
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(middleware::logging::log_request))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::permissive();
    }

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([headers::RATE_LIMIT_REMAINING, headers::RATE_LIMIT_RESET]);

    if config.cors.origins.iter().any(|o| o == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors
            .origins
            .iter()
            .filter_map(|origin| origin.parse::<axum::http::HeaderValue>().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    cors
}
