//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::InMemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    setup_with_prefix("/api/v1")
}

fn setup_with_prefix(prefix: &str) -> axum::Router {
    let state = api::create_state(InMemoryStore::new());
    api::create_app(state, get_metrics_handle(), prefix)
}

/// Sends one request and returns the status with the decoded JSON body
/// (`Value::Null` for empty bodies).
async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_lecturer(app: &axum::Router) -> i64 {
    let (status, json) = send(
        app,
        "POST",
        "/api/v1/lecturers",
        Some(json!({
            "firstName": "John",
            "lastName": "Doe",
            "title": "Dr",
            "email": "example@mail.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_i64().unwrap()
}

async fn create_student(app: &axum::Router, first_name: &str) -> i64 {
    let (status, json) = send(
        app,
        "POST",
        "/api/v1/students",
        Some(json!({
            "firstName": first_name,
            "lastName": "Smith",
            "indexCode": "123456",
            "studiesStartYear": 2021
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_course_lifecycle() {
    let app = setup();

    // 1. Create a course with no students
    let l1 = create_lecturer(&app).await;
    let (status, course) = send(
        &app,
        "POST",
        "/api/v1/courses",
        Some(json!({"courseName": "CS101", "leadingLecturerId": l1, "studentsIds": []})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(course["leadingLecturerDto"]["id"], l1);
    assert_eq!(course["studentDtos"], json!([]));
    let course_id = course["id"].as_i64().unwrap();

    // 2. Enroll a student through a full update
    let s1 = create_student(&app, "Jack").await;
    let (status, updated) = send(
        &app,
        "PUT",
        "/api/v1/courses",
        Some(json!({
            "id": course_id,
            "courseName": "CS101",
            "leadingLecturerId": l1,
            "studentsIds": [s1]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, student) = send(&app, "GET", &format!("/api/v1/students/{s1}"), None).await;
    assert_eq!(updated["studentDtos"], json!([student]));

    // 3. A repeated student id is rejected and nothing changes
    let (status, error) = send(
        &app,
        "PUT",
        "/api/v1/courses",
        Some(json!({
            "id": course_id,
            "courseName": "Renamed",
            "leadingLecturerId": l1,
            "studentsIds": [s1, s1]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["httpStatusCode"], 400);
    let (_, stored) = send(&app, "GET", &format!("/api/v1/courses/{course_id}"), None).await;
    assert_eq!(stored, updated);

    // 4. Delete, then the course is gone
    let (status, _) = send(&app, "DELETE", &format!("/api/v1/courses/{course_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, error) = send(&app, "GET", &format!("/api/v1/courses/{course_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(error["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_error_envelope_shape() {
    let app = setup();

    let (status, json) = send(&app, "GET", "/api/v1/students/42", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json,
        json!({
            "httpStatusCode": 404,
            "method": "GET",
            "requestUri": "/api/v1/students/42",
            "message": "Student with id 42 not found"
        })
    );
}

#[tokio::test]
async fn test_create_course_with_missing_lecturer() {
    let app = setup();

    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/courses",
        Some(json!({"courseName": "CS101", "leadingLecturerId": 7, "studentsIds": []})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Lecturer with id 7 not found");
    let (_, courses) = send(&app, "GET", "/api/v1/courses", None).await;
    assert_eq!(courses, json!([]));
}

#[tokio::test]
async fn test_validation_errors_are_aggregated() {
    let app = setup();

    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/lecturers",
        Some(json!({"firstName": "", "lastName": "Doe", "title": "Dr", "email": "not-an-email"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        "[firstName First name cannot be empty, email Email should be valid]"
    );
    assert_eq!(json["method"], "POST");
}

#[tokio::test]
async fn test_null_and_malformed_bodies() {
    let app = setup();

    let (status, json) = send(&app, "POST", "/api/v1/students", Some(Value::Null)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Request body must not be null");

    let (status, json) = send(
        &app,
        "POST",
        "/api/v1/courses",
        Some(json!({"courseName": "CS101", "leadingLecturerId": "one", "studentsIds": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["httpStatusCode"], 400);
}

#[tokio::test]
async fn test_student_update_and_delete() {
    let app = setup();
    let id = create_student(&app, "John").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/students",
        Some(json!({
            "id": id,
            "firstName": "Johnny",
            "lastName": "Smith",
            "indexCode": "654321",
            "studiesStartYear": 2022
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, student) = send(&app, "GET", &format!("/api/v1/students/{id}"), None).await;
    assert_eq!(student["firstName"], "Johnny");
    assert_eq!(student["indexCode"], "654321");

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/students/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = send(&app, "DELETE", &format!("/api/v1/students/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json["message"],
        format!("Delete failed. Student with id {id} not found")
    );
}

#[tokio::test]
async fn test_update_of_missing_lecturer() {
    let app = setup();

    let (status, json) = send(
        &app,
        "PUT",
        "/api/v1/lecturers",
        Some(json!({
            "id": 9,
            "firstName": "John",
            "lastName": "Doe",
            "title": "Dr",
            "email": "example@mail.com"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Update failed. Lecturer with id 9 not found");
}

#[tokio::test]
async fn test_deleting_enrolled_student_conflicts() {
    let app = setup();
    let l1 = create_lecturer(&app).await;
    let s1 = create_student(&app, "Jack").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/courses",
        Some(json!({"courseName": "CS101", "leadingLecturerId": l1, "studentsIds": [s1]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(&app, "DELETE", &format!("/api/v1/students/{s1}"), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "Data integrity violation. Request rejected");
    let (status, _) = send(&app, "GET", &format!("/api/v1/students/{s1}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_and_bad_id() {
    let app = setup();

    let (status, json) = send(&app, "GET", "/api/v1/professors", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["requestUri"], "/api/v1/professors");

    let (status, json) = send(&app, "GET", "/api/v1/courses/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["httpStatusCode"], 400);
}

#[tokio::test]
async fn test_unsupported_method_uses_envelope() {
    let app = setup();

    let (status, json) = send(&app, "PATCH", "/api/v1/courses", None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        json,
        json!({
            "httpStatusCode": 405,
            "method": "PATCH",
            "requestUri": "/api/v1/courses",
            "message": "Request method 'PATCH' is not supported"
        })
    );
}

#[tokio::test]
async fn test_root_prefix() {
    let app = setup_with_prefix("");

    let (status, json) = send(&app, "GET", "/lecturers", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    create_lecturer(&app).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("records_created_total"));
}
