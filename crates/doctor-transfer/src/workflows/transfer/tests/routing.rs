use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::transfer::{status_for, TransferService, TransferServiceError};

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn doctors_route_honours_limit() {
    let (service, _) = build_service();
    let router = transfer_router_with_service(service);

    let response = router
        .oneshot(get("/api/doctors?limit=2"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["count"], 2);
    assert_eq!(payload["doctors"][1]["merit_rank"], 2);
}

#[tokio::test]
async fn preferences_then_assignment_round_trip() {
    let (service, _) = build_service();
    let router = transfer_router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/preferences/rank/2",
            json!([
                { "vacancy_id": 3, "order_index": 0 },
                { "vacancy_id": 1, "order_index": 1 },
            ]),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await["count"], 2);

    let response = router
        .clone()
        .oneshot(get("/api/preferences/assignment/rank/2"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["assigned"], true);
    assert_eq!(payload["vacancy"]["district"], "Kandy");

    let response = router
        .oneshot(get("/api/preferences/position/rank/2"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "assigned");
    assert_eq!(payload["preference_position"], 1);
}

#[tokio::test]
async fn duplicate_preferences_are_bad_requests() {
    let (service, _) = build_service();
    let router = transfer_router_with_service(service);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/preferences/rank/1",
            json!([
                { "vacancy_id": 1, "order_index": 0 },
                { "vacancy_id": 1, "order_index": 1 },
            ]),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .starts_with("Duplicate preferences detected"));
}

#[tokio::test]
async fn unknown_rank_is_not_found() {
    let (service, _) = build_service();
    let router = transfer_router_with_service(service);

    let response = router
        .oneshot(get("/api/preferences/assignment/rank/404"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "Doctor with merit rank 404 not found");
}

#[tokio::test]
async fn couple_routes_apply_list_and_remove() {
    let (service, _) = build_service();
    let router = transfer_router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/couple/apply",
            json!({ "doctor1_merit_rank": 1, "doctor2_merit_rank": 3 }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json_body(response).await;
    assert_eq!(created["effective_merit_rank"], 3);
    let couple_id = created["id"].as_u64().expect("numeric id");

    let response = router
        .clone()
        .oneshot(get("/api/couple/all"))
        .await
        .expect("route executes");
    let listed = read_json_body(response).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let response = router
        .clone()
        .oneshot(get("/api/couple/doctor/3"))
        .await
        .expect("route executes");
    let info = read_json_body(response).await;
    assert_eq!(info["is_in_couple"], true);
    assert_eq!(info["partner"]["merit_rank"], 1);

    let response = router
        .clone()
        .oneshot(
            Request::delete(format!("/api/couple/{couple_id}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::delete(format!("/api/couple/{couple_id}9"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vacancy_routes_filter_by_query() {
    let (service, _) = build_service();
    let router = transfer_router_with_service(service);

    let response = router
        .clone()
        .oneshot(get("/api/vacancies?district=colombo&min_count=2"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let listings = payload.as_array().expect("array");
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["designation"], "Registrar");

    let response = router
        .oneshot(get("/api/vacancies/filters"))
        .await
        .expect("route executes");
    let options = read_json_body(response).await;
    assert_eq!(options["institutions"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn summary_report_route_returns_statistics() {
    let (service, _) = build_service();
    let router = transfer_router_with_service(service);

    let response = router
        .oneshot(get("/api/reports/summary"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["statistics"]["total_doctors"], 4);
    assert_eq!(payload["assignment_summary"]["assigned_count"], 0);
}

#[tokio::test]
async fn admin_login_rejects_wrong_password() {
    let (service, _) = build_service();
    let router = transfer_router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/admin/login",
            json!({ "username": "admin", "password": "guess" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router
        .oneshot(
            Request::post("/api/auth/doctor/login/rank/2")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let session = read_json_body(response).await;
    assert_eq!(session["role"], "doctor");
    assert_eq!(session["name"], "Dr. Bimal Silva");
}

#[tokio::test]
async fn handlers_return_internal_error_on_repository_failure() {
    let service = Arc::new(TransferService::new(
        Arc::new(UnavailableRepository),
        admin(),
    ));

    let response = crate::workflows::transfer::router::summary_report_handler::<
        UnavailableRepository,
    >(State(service))
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("database offline"));
}

#[tokio::test]
async fn import_storage_failures_are_server_errors() {
    let service = TransferService::new(Arc::new(UnavailableRepository), admin());

    let error = service
        .import_vacancies(std::io::Cursor::new(VACANCIES_CSV))
        .expect_err("store is offline");
    assert!(matches!(error, TransferServiceError::Import(_)));
    assert_eq!(status_for(&error), StatusCode::INTERNAL_SERVER_ERROR);

    let malformed = service
        .import_doctors(std::io::Cursor::new("Rank,Name\n1,A\n"))
        .expect_err("missing merit column");
    assert_eq!(status_for(&malformed), StatusCode::BAD_REQUEST);
}
