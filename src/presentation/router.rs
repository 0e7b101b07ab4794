// Router assembly for the dashboard API
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    classify_reading, get_history, get_latest, get_parameters, get_quality, get_recommendations,
    get_status, get_trend, get_trends, health_check,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/history", get(get_history))
        .route("/api/latest", get(get_latest))
        .route("/api/quality", get(get_quality).post(classify_reading))
        .route("/api/trends", get(get_trends))
        .route("/api/trends/:parameter", get(get_trend))
        .route("/api/recommendations", get(get_recommendations))
        .route("/api/status", get(get_status))
        .route("/api/parameters", get(get_parameters))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
