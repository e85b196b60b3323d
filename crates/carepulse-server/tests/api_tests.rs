//! HTTP API integration tests against the local backend.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use carepulse_core::validation::is_valid_phone;
use carepulse_core::{Actions, Collections, LocalBackend};
use carepulse_server::{app, AppState};

const PASSKEY: &str = "111111";
const BOUNDARY: &str = "carepulse-test-boundary";

fn collections() -> Collections {
    Collections {
        database_id: Some("main".into()),
        patient_collection_id: Some("patients".into()),
        appointment_collection_id: Some("appointments".into()),
        bucket_id: Some("ids".into()),
    }
}

fn test_app() -> Router {
    app_with(collections())
}

fn app_with(collections: Collections) -> Router {
    let backend = LocalBackend::open_in_memory().unwrap();
    let actions = Actions::new(Arc::new(backend), collections);
    app(AppState::new(actions, PASSKEY))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
    };
    (status, body)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_request(method: Method, uri: &str, passkey: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(passkey) = passkey {
        builder = builder.header("X-Admin-Passkey", passkey);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn appointment_form() -> Value {
    json!({
        "userId": "user-1",
        "patient": "patient-1",
        "primaryPhysician": "Leila Cameron",
        "schedule": "2024-05-01T09:30:00Z",
        "reason": "Annual checkup",
        "note": "Morning preferred"
    })
}

fn patient_form() -> Value {
    json!({
        "userId": "user-1",
        "name": "Riya Sharma",
        "email": "riya@example.com",
        "phone": "+15555550100",
        "birthDate": "1990-01-15",
        "gender": "female",
        "address": "12 Harbour Road",
        "occupation": "Engineer",
        "emergencyContactName": "Arjun Sharma",
        "emergencyContactNumber": "+15555550111",
        "primaryPhysician": "Leila Cameron",
        "insuranceProvider": "BlueCross",
        "insurancePolicyNumber": "ABC123",
        "treatmentConsent": true,
        "disclosureConsent": true,
        "privacyConsent": true
    })
}

fn multipart_request(patient: &Value, document: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"patient\"\r\n\r\n{p}\r\n",
            b = BOUNDARY,
            p = patient
        )
        .as_bytes(),
    );
    if let Some((file_name, bytes)) = document {
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"identificationDocument\"; filename=\"{f}\"\r\nContent-Type: image/png\r\n\r\n",
                b = BOUNDARY,
                f = file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/patients")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn book(app: &Router) -> String {
    let (status, body) = send(app, json_request(Method::POST, "/api/appointments", appointment_form())).await;
    assert_eq!(status, StatusCode::CREATED);
    body["appointment"]["record"]["$id"].as_str().unwrap().to_string()
}

// =========================================================================
// Users
// =========================================================================

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&test_app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_user_route_statuses() {
    let app = test_app();
    let user = json!({"name": "Riya Sharma", "email": "riya@example.com", "phone": "+15555550100"});

    let (status, body) = send(&app, json_request(Method::POST, "/api/create-user", user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let id = body["user"]["$id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, json_request(Method::POST, "/api/create-user", user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["$id"], id.as_str());

    let (status, body) = send(&app, get(&format!("/api/users/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "riya@example.com");
}

#[tokio::test]
async fn test_create_user_route_rejects_bad_input() {
    let app = test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/create-user")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON in request body");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/create-user", json!({"name": "Riya", "email": "riya@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Missing required fields: name, email, and phone are required"
    );

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/create-user",
            json!({"name": "Riya", "email": "riya@", "phone": "+15555550100"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email format");
}

#[tokio::test]
async fn test_create_user_route_unresolvable_conflict() {
    let app = test_app();
    let first = json!({"name": "Riya", "email": "riya@example.com", "phone": "+15555550100"});
    let second = json!({"name": "Riya", "email": "other@example.com", "phone": "+15555550100"});

    send(&app, json_request(Method::POST, "/api/create-user", first)).await;
    let (status, _) = send(&app, json_request(Method::POST, "/api/create-user", second)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_users_route_validates_phone() {
    let (status, body) = send(
        &test_app(),
        json_request(
            Method::POST,
            "/api/users",
            json!({"name": "Riya", "email": "riya@example.com", "phone": "5555550100"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "phone");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_users_route_rejects_malformed_phone(phone in "[+0-9a-z ()-]{0,20}") {
        prop_assume!(!is_valid_phone(&phone));
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let user = json!({"name": "Riya", "email": "riya@example.com", "phone": phone});
        let (status, body) =
            runtime.block_on(send(&test_app(), json_request(Method::POST, "/api/users", user)));
        prop_assert_eq!(status, StatusCode::BAD_REQUEST);
        prop_assert_eq!(body["fields"][0]["field"].as_str(), Some("phone"));
    }
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let (status, _) = send(&test_app(), get("/api/users/temp-abc")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =========================================================================
// Patients
// =========================================================================

#[tokio::test]
async fn test_register_patient_multipart() {
    let app = test_app();
    let request = multipart_request(&patient_form(), Some(("passport.png", b"scan")));
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["patient"]["durability"], "persisted");
    let url = body["patient"]["record"]["identificationDocumentUrl"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(body["redirect"]
        .as_str()
        .unwrap()
        .starts_with("/patients/user-1/new-appointment?fallbackName=Riya+Sharma"));

    let response = app.clone().oneshot(get(&url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"scan");

    let (status, body) = send(&app, get("/api/patients/user-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Riya Sharma");
}

#[tokio::test]
async fn test_register_patient_requires_consent() {
    let mut form = patient_form();
    form["privacyConsent"] = json!(false);
    let (status, body) = send(&test_app(), multipart_request(&form, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<_> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["privacyConsent"]);
}

#[tokio::test]
async fn test_register_patient_without_collection_is_synthetic() {
    let app = app_with(Collections::default());
    let (status, body) = send(&app, multipart_request(&patient_form(), None)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["patient"]["durability"], "synthetic");
    assert!(body["patient"]["record"]["$id"]
        .as_str()
        .unwrap()
        .starts_with("temp-"));
    assert_eq!(body["patient"]["record"]["identificationDocumentUrl"], Value::Null);
}

// =========================================================================
// Appointments
// =========================================================================

#[tokio::test]
async fn test_book_appointment() {
    let app = test_app();
    let (status, body) = send(&app, json_request(Method::POST, "/api/appointments", appointment_form())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["appointment"]["durability"], "persisted");
    assert_eq!(body["appointment"]["record"]["status"], "pending");
    let id = body["appointment"]["record"]["$id"].as_str().unwrap();
    assert!(body["redirect"]
        .as_str()
        .unwrap()
        .starts_with(&format!("/patients/user-1/new-appointment/success?appointmentId={}", id)));

    let (status, fetched) = send(&app, get(&format!("/api/appointments/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["reason"], "Annual checkup");
}

#[tokio::test]
async fn test_book_appointment_requires_reason() {
    let mut form = appointment_form();
    form["reason"] = json!("x");
    let (status, body) = send(&test_app(), json_request(Method::POST, "/api/appointments", form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "reason");
}

#[tokio::test]
async fn test_admin_routes_require_passkey() {
    let app = test_app();

    let (status, _) = send(&app, admin_request(Method::GET, "/api/admin/appointments", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        admin_request(Method::GET, "/api/admin/appointments", Some("000000"), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        admin_request(Method::PATCH, "/api/appointments/appt-1", None, Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_schedule_and_cancel() {
    let app = test_app();
    let first = book(&app).await;
    let second = book(&app).await;
    book(&app).await;

    let schedule = json!({
        "type": "schedule",
        "userId": "user-1",
        "appointment": {
            "primaryPhysician": "John Green",
            "schedule": "2024-05-02T14:00:00Z"
        }
    });
    let (status, body) = send(
        &app,
        admin_request(Method::PATCH, &format!("/api/appointments/{}", first), Some(PASSKEY), Some(schedule)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["durability"], "persisted");
    assert_eq!(body["record"]["status"], "scheduled");
    assert_eq!(body["record"]["primaryPhysician"], "John Green");

    // Cancelling checks only the reason
    let cancel = json!({
        "type": "cancel",
        "userId": "user-1",
        "appointment": { "cancellationReason": "x" }
    });
    let (status, body) = send(
        &app,
        admin_request(Method::PATCH, &format!("/api/appointments/{}", second), Some(PASSKEY), Some(cancel)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "cancellationReason");

    let cancel = json!({
        "type": "cancel",
        "userId": "user-1",
        "appointment": { "cancellationReason": "Physician unavailable" }
    });
    let (status, body) = send(
        &app,
        admin_request(Method::PATCH, &format!("/api/appointments/{}", second), Some(PASSKEY), Some(cancel.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["status"], "cancelled");

    let reschedule = json!({
        "type": "schedule",
        "appointment": {
            "userId": "user-1",
            "primaryPhysician": "John Green",
            "schedule": "2024-05-03T14:00:00Z"
        }
    });
    let (status, _) = send(
        &app,
        admin_request(Method::PATCH, &format!("/api/appointments/{}", second), Some(PASSKEY), Some(reschedule)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, summary) = send(
        &app,
        admin_request(Method::GET, "/api/admin/appointments", Some(PASSKEY), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalCount"], 3);
    assert_eq!(summary["scheduledCount"], 1);
    assert_eq!(summary["pendingCount"], 1);
    assert_eq!(summary["cancelledCount"], 1);
}

// =========================================================================
// Pages
// =========================================================================

#[tokio::test]
async fn test_booking_success_redirects() {
    let response = test_app()
        .oneshot(get(
            "/patients/user-1/new-appointment/success?appointmentId=temp-abc&fallbackDoctor=Leila+Cameron",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/success/temp-abc?appointmentId=temp-abc&fallbackDoctor=Leila+Cameron&userId=user-1"
    );
}

#[tokio::test]
async fn test_success_view_states() {
    let app = test_app();

    let (status, body) = send(
        &app,
        get("/success/temp-abc?userId=user-1&fallbackDoctor=Leila+Cameron&fallbackReason=Checkup"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "found");
    assert_eq!(body["source"], "query_fallback");
    assert_eq!(body["details"]["primaryPhysician"], "Leila Cameron");
    assert_eq!(body["details"]["reason"], "Checkup");
    assert_eq!(body["bookAgain"], "/patients/user-1/new-appointment");

    let (_, body) = send(&app, get("/success/temp-abc")).await;
    assert_eq!(body["state"], "not_found");
    assert_eq!(body["bookAgain"], "/");

    let (_, body) = send(&app, get("/success")).await;
    assert_eq!(body["state"], "missing_id");

    let id = book(&app).await;
    let (_, body) = send(&app, get(&format!("/success/{}", id))).await;
    assert_eq!(body["state"], "found");
    assert_eq!(body["source"], "backend");
    assert_eq!(body["details"]["scheduleDisplay"], "May 1, 2024, 9:30 AM");
}
