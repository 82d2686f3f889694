mod common;

use axum::{
    body::{self, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use report_cell::router::report_routes;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

use common::Ward;

fn app(ward: &Ward) -> Router {
    report_routes(TestConfig::default().to_arc(), ward.reports.clone())
}

fn authorized(builder: axum::http::request::Builder, user: &TestUser) -> axum::http::request::Builder {
    let token = JwtTestUtils::create_test_token(user, &TestConfig::default().jwt_secret, None);
    builder.header(header::AUTHORIZATION, format!("Bearer {}", token))
}

fn post_report(user: &TestUser, payload: Value) -> Request<Body> {
    authorized(Request::builder().method(Method::POST).uri("/reports"), user)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let ward = Ward::new().await;

    let response = app(&ward)
        .oneshot(Request::builder().uri("/reports").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_report_statuses() {
    let ward = Ward::new().await;
    let appointment = ward.book("2024-06-01T10:00").await;
    let router = app(&ward);
    let payload = json!({ "appointment_id": appointment.id, "diagnosis": "Sprained ankle" });

    let by_nurse = router.clone()
        .oneshot(post_report(&ward.nurse, payload.clone()))
        .await
        .unwrap();
    assert_eq!(by_nurse.status(), StatusCode::FORBIDDEN);

    let created = router.clone()
        .oneshot(post_report(&ward.doctor, payload.clone()))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let report = read_json(created).await;
    assert_eq!(report["appointment_id"], json!(appointment.id));
    assert_eq!(report["patient_id"], json!(ward.patient.id));

    let duplicate = router.clone()
        .oneshot(post_report(&ward.doctor, payload))
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

    let unknown = router
        .oneshot(post_report(&ward.doctor, json!({ "appointment_id": Uuid::new_v4(), "diagnosis": "Flu" })))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_read_reports() {
    let ward = Ward::new().await;
    let appointment = ward.book("2024-06-01T10:00").await;
    let router = app(&ward);

    let created = router.clone()
        .oneshot(post_report(&ward.doctor, json!({ "appointment_id": appointment.id, "diagnosis": "Sprained ankle" })))
        .await
        .unwrap();
    let report_id = read_json(created).await["id"].as_str().unwrap().to_string();

    let fetched = router.clone()
        .oneshot(authorized(Request::builder().uri(format!("/reports/{}", report_id)), &ward.admin)
            .body(Body::empty())
            .unwrap())
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(read_json(fetched).await["diagnosis"], "Sprained ankle");

    let missing = router.clone()
        .oneshot(authorized(Request::builder().uri(format!("/reports/{}", Uuid::new_v4())), &ward.admin)
            .body(Body::empty())
            .unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let listed = router
        .oneshot(authorized(Request::builder().uri(format!("/reports?appointment_id={}", appointment.id)), &ward.nurse)
            .body(Body::empty())
            .unwrap())
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    assert_eq!(read_json(listed).await.as_array().unwrap().len(), 1);
}
