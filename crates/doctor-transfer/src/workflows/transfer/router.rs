use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::repository::{RepositoryError, TransferRepository};
use super::service::{TransferService, TransferServiceError, DOCTOR_PAGE_SIZE};
use super::views::{AdminLoginRequest, CoupleRequest, PreferenceItem, VacancyFilter};
use crate::workflows::allocation::domain::{CoupleApplicationId, DoctorId};
use crate::workflows::import::ImportError;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DoctorListQuery {
    pub(crate) limit: Option<usize>,
}

/// Router builder exposing the doctor, preference, couple, catalog, report and login
/// endpoints.
pub fn transfer_router<R>(service: Arc<TransferService<R>>) -> Router
where
    R: TransferRepository + 'static,
{
    Router::new()
        .route("/api/doctors", get(list_doctors_handler::<R>))
        .route("/api/doctors/rank/:rank", get(doctor_by_rank_handler::<R>))
        .route("/api/doctors/:doctor_id", get(doctor_handler::<R>))
        .route(
            "/api/preferences/rank/:rank",
            get(preferences_handler::<R>).post(save_preferences_handler::<R>),
        )
        .route(
            "/api/preferences/assignment/rank/:rank",
            get(assignment_handler::<R>),
        )
        .route(
            "/api/preferences/position/rank/:rank",
            get(position_handler::<R>),
        )
        .route("/api/couple/apply", post(apply_couple_handler::<R>))
        .route("/api/couple/all", get(couples_handler::<R>))
        .route("/api/couple/doctor/:rank", get(couple_info_handler::<R>))
        .route("/api/couple/:couple_id", delete(remove_couple_handler::<R>))
        .route("/api/vacancies", get(vacancies_handler::<R>))
        .route("/api/vacancies/filters", get(filter_options_handler::<R>))
        .route("/api/reports/summary", get(summary_report_handler::<R>))
        .route("/api/reports/doctors", get(doctor_report_handler::<R>))
        .route("/api/reports/vacancies", get(vacancy_report_handler::<R>))
        .route("/api/reports/couples", get(couple_report_handler::<R>))
        .route("/api/auth/admin/login", post(admin_login_handler::<R>))
        .route(
            "/api/auth/doctor/login/rank/:rank",
            post(doctor_login_handler::<R>),
        )
        .with_state(service)
}

/// HTTP status for a service failure.
pub fn status_for(error: &TransferServiceError) -> StatusCode {
    match error {
        TransferServiceError::DoctorNotFound { .. }
        | TransferServiceError::CoupleNotFound { .. } => StatusCode::NOT_FOUND,
        TransferServiceError::SelfCouple
        | TransferServiceError::AlreadyCoupled
        | TransferServiceError::DuplicatePreferences { .. }
        | TransferServiceError::UnknownVacancy { .. } => StatusCode::BAD_REQUEST,
        TransferServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
        TransferServiceError::Import(error) => import_status_for(error),
        TransferServiceError::Repository(error) => repository_status_for(error),
    }
}

/// HTTP status for an import failure: bad uploads are the caller's fault, storage and
/// read failures are not.
pub fn import_status_for(error: &ImportError) -> StatusCode {
    match error {
        ImportError::Csv(_) | ImportError::MissingColumns { .. } => StatusCode::BAD_REQUEST,
        ImportError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ImportError::Repository(error) => repository_status_for(error),
    }
}

fn repository_status_for(error: &RepositoryError) -> StatusCode {
    match error {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict => StatusCode::BAD_REQUEST,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(error: TransferServiceError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        warn!(%error, "transfer request failed");
    }
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(result: Result<T, TransferServiceError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_doctors_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
    Query(query): Query<DoctorListQuery>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.list_doctors(query.limit.unwrap_or(DOCTOR_PAGE_SIZE)))
}

pub(crate) async fn doctor_by_rank_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
    Path(rank): Path<u32>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.doctor_by_rank(rank))
}

pub(crate) async fn doctor_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
    Path(doctor_id): Path<u32>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.doctor(DoctorId(doctor_id)))
}

pub(crate) async fn preferences_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
    Path(rank): Path<u32>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.preferences(rank))
}

pub(crate) async fn save_preferences_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
    Path(rank): Path<u32>,
    Json(items): Json<Vec<PreferenceItem>>,
) -> Response
where
    R: TransferRepository + 'static,
{
    match service.save_preferences(rank, items) {
        Ok(preferences) => {
            let payload = json!({
                "message": "Preferences saved successfully",
                "count": preferences.len(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assignment_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
    Path(rank): Path<u32>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.assignment(rank))
}

pub(crate) async fn position_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
    Path(rank): Path<u32>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.position(rank))
}

pub(crate) async fn apply_couple_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
    Json(request): Json<CoupleRequest>,
) -> Response
where
    R: TransferRepository + 'static,
{
    match service.apply_couple(request.doctor1_merit_rank, request.doctor2_merit_rank) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn couples_handler<R>(State(service): State<Arc<TransferService<R>>>) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.couples())
}

pub(crate) async fn couple_info_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
    Path(rank): Path<u32>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.couple_info(rank))
}

pub(crate) async fn remove_couple_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
    Path(couple_id): Path<u32>,
) -> Response
where
    R: TransferRepository + 'static,
{
    match service.remove_couple(CoupleApplicationId(couple_id)) {
        Ok(()) => {
            let payload = json!({ "message": "Couple application removed successfully" });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn vacancies_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
    Query(filter): Query<VacancyFilter>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.vacancies(&filter))
}

pub(crate) async fn filter_options_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.filter_options())
}

pub(crate) async fn summary_report_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.summary_report())
}

pub(crate) async fn doctor_report_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.doctor_report())
}

pub(crate) async fn vacancy_report_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.vacancy_report())
}

pub(crate) async fn couple_report_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.couple_report())
}

pub(crate) async fn admin_login_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
    Json(request): Json<AdminLoginRequest>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.admin_login(&request.username, &request.password))
}

pub(crate) async fn doctor_login_handler<R>(
    State(service): State<Arc<TransferService<R>>>,
    Path(rank): Path<u32>,
) -> Response
where
    R: TransferRepository + 'static,
{
    respond(service.doctor_login(rank))
}
