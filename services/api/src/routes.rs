use crate::infra::{AppState, SharedTransferService};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Extension;
use axum::{Json, Router};
use doctor_transfer::error::AppError;
use doctor_transfer::workflows::import::ImportSummary;
use doctor_transfer::workflows::transfer::transfer_router;
use serde_json::json;
use std::io::Cursor;

pub(crate) fn with_transfer_routes(service: SharedTransferService) -> Router {
    let imports = Router::new()
        .route("/api/import/vacancies", post(import_vacancies_endpoint))
        .route(
            "/api/import/difficult-stations",
            post(import_difficult_stations_endpoint),
        )
        .route("/api/import/doctors", post(import_doctors_endpoint))
        .route("/api/import/preferences", post(import_preferences_endpoint))
        .route("/api/import/clear", post(clear_endpoint))
        .with_state(service.clone());

    transfer_router(service)
        .merge(imports)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn import_vacancies_endpoint(
    State(service): State<SharedTransferService>,
    body: String,
) -> Result<Json<ImportSummary>, AppError> {
    Ok(Json(service.import_vacancies(Cursor::new(body))?))
}

pub(crate) async fn import_difficult_stations_endpoint(
    State(service): State<SharedTransferService>,
    body: String,
) -> Result<Json<ImportSummary>, AppError> {
    Ok(Json(service.import_difficult_stations(Cursor::new(body))?))
}

pub(crate) async fn import_doctors_endpoint(
    State(service): State<SharedTransferService>,
    body: String,
) -> Result<Json<ImportSummary>, AppError> {
    Ok(Json(service.import_doctors(Cursor::new(body))?))
}

pub(crate) async fn import_preferences_endpoint(
    State(service): State<SharedTransferService>,
    body: String,
) -> Result<Json<ImportSummary>, AppError> {
    Ok(Json(service.import_preferences(Cursor::new(body))?))
}

pub(crate) async fn clear_endpoint(
    State(service): State<SharedTransferService>,
) -> Result<Json<serde_json::Value>, AppError> {
    service.clear_all()?;
    Ok(Json(json!({ "message": "All data cleared successfully" })))
}
