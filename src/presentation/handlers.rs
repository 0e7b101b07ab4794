// HTTP request handlers
use crate::domain::reading::{CanonicalReading, Parameter};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Serialize)]
pub struct ParameterInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: Option<&'static str>,
    pub precision: usize,
    pub description: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard_service.get_history())
}

/// Newest reading, `null` while nothing has been received
pub async fn get_latest(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard_service.get_latest())
}

pub async fn get_quality(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard_service.classify_latest())
}

/// Classify a caller-supplied reading
pub async fn classify_reading(
    State(state): State<Arc<AppState>>,
    Json(reading): Json<CanonicalReading>,
) -> impl IntoResponse {
    Json(state.dashboard_service.classify(&reading))
}

pub async fn get_trends(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard_service.trends())
}

pub async fn get_trend(
    Path(parameter): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match parameter.parse::<Parameter>() {
        Ok(parameter) => Json(json!({
            "parameter": parameter.key(),
            "trend": state.dashboard_service.trend(parameter),
        }))
        .into_response(),
        Err(e) => (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))).into_response(),
    }
}

pub async fn get_recommendations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard_service.advisory())
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard_service.status())
}

pub async fn get_parameters() -> impl IntoResponse {
    let parameters: Vec<ParameterInfo> = Parameter::ALL
        .iter()
        .map(|p| ParameterInfo {
            key: p.key(),
            label: p.label(),
            unit: p.unit(),
            precision: p.precision(),
            description: p.description(),
        })
        .collect();
    Json(parameters)
}
