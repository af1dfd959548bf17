use super::*;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use http_body_util::BodyExt;
use medichain_core::{AdvisorError, HealthAdvisor, InMemoryLedger, TextGenerator};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const HOSPITAL: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
const PATIENT: &str = "123456789012";

struct Canned;

#[async_trait]
impl TextGenerator for Canned {
    async fn generate(&self, _prompt: &str) -> Result<String, AdvisorError> {
        Ok("Drink plenty of water.".into())
    }
}

fn app_with(advisor: HealthAdvisor) -> Router {
    let portal = PortalService::new(Arc::new(InMemoryLedger::new()), advisor);
    router(AppState::new(portal))
}

fn app() -> Router {
    app_with(HealthAdvisor::new(Arc::new(Canned)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn register(app: &Router) {
    let (status, _) = send(
        app,
        Method::POST,
        "/hospitals",
        Some(json!({ "address": HOSPITAL })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

fn prescription(diagnosis: &str) -> Value {
    json!({
        "hospital": HOSPITAL,
        "patient_id": PATIENT,
        "diagnosis": diagnosis,
        "medication": "Metformin",
        "dosage": "500mg",
        "notes": "after meals"
    })
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn duplicate_hospital_is_conflict() {
    let app = app();
    register(&app).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/hospitals",
        Some(json!({ "address": HOSPITAL })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn prescriptions_flow_through_to_analytics() {
    let app = app();
    register(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/prescriptions",
        Some(prescription("Diabetes")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["health_coins"], 10);
    assert_eq!(body["prescription"]["diagnosis"], "Diabetes");

    let uri = format!("/patients/{PATIENT}/prescriptions");
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prescriptions"].as_array().map(Vec::len), Some(1));

    let uri = format!("/patients/{PATIENT}/analytics");
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trend"]["direction"], "stable");
    assert_eq!(body["trend"]["recent_value"], 1);
    assert_eq!(body["patterns"][0]["description"], "Diabetes: 1 prescriptions");
    assert_eq!(body["recommendations"][0]["priority"], "MEDIUM");
}

#[tokio::test]
async fn unregistered_hospital_is_forbidden() {
    let (status, _) = send(
        &app(),
        Method::POST,
        "/prescriptions",
        Some(prescription("Diabetes")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_aadhar_is_bad_request_with_message() {
    let (status, body) = send(&app(), Method::GET, "/patients/42/health-coins", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter a valid 12-digit Aadhar number");
}

#[tokio::test]
async fn health_metrics_raise_alerts() {
    let app = app();
    register(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/health-metrics",
        Some(json!({
            "hospital": HOSPITAL,
            "patient_id": PATIENT,
            "diagnosis": "Fever",
            "medication": "Paracetamol",
            "dosage": "650mg",
            "frequency": "twice_daily",
            "temperature": "102"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["prescription"]["notes"],
        "Temp: 102°F, Frequency: twice_daily"
    );

    let uri = format!("/patients/{PATIENT}/analytics");
    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["alerts"][0]["kind"], "FEVER");
}

#[tokio::test]
async fn coins_can_be_redeemed_until_exhausted() {
    let app = app();
    register(&app).await;
    send(&app, Method::POST, "/prescriptions", Some(prescription("Asthma"))).await;

    let uri = format!("/patients/{PATIENT}/health-coins/redeem");
    let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "amount": 4 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["patient_id"], PATIENT);
    assert_eq!(body["health_coins"], 6);

    let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "amount": 7 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Insufficient health coins");
}

#[tokio::test]
async fn appointment_status_updates() {
    let app = app();
    register(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/appointments",
        Some(json!({
            "patient_id": PATIENT,
            "hospital": HOSPITAL,
            "timestamp": 1_700_000_000,
            "contact_email": "patient@example.com",
            "contact_phone": "9876543210",
            "department": "Neurology"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["id"], 0);
    assert_eq!(body["appointment"]["status"], 0);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/appointments/0/status",
        Some(json!({ "status": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], 2);

    // Cancelled is terminal.
    let (status, _) = send(
        &app,
        Method::PUT,
        "/appointments/0/status",
        Some(json!({ "status": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/appointments/7/status",
        Some(json!({ "status": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/hospitals/{HOSPITAL}/appointments");
    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["appointments"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn invalid_contact_email_is_rejected() {
    let app = app();
    register(&app).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/appointments",
        Some(json!({
            "patient_id": PATIENT,
            "hospital": HOSPITAL,
            "timestamp": 1_700_000_000,
            "contact_email": "not-an-email",
            "contact_phone": "9876543210"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter a valid email address");
}

#[tokio::test]
async fn advisor_answers_and_validates() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/health-advisor",
        Some(json!({ "messages": [{ "role": "user", "content": "I feel dizzy" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Drink plenty of water.");

    let (status, body) = send(
        &app,
        Method::POST,
        "/health-advisor",
        Some(json!({ "messages": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid messages format");
}

#[tokio::test]
async fn disabled_advisor_returns_generic_failure() {
    let app = app_with(HealthAdvisor::disabled());
    let (status, body) = send(
        &app,
        Method::POST,
        "/health-advisor",
        Some(json!({ "messages": [{ "role": "user", "content": "hello" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "An error occurred while processing your request. Please try again."
    );
}

#[tokio::test]
async fn store_lists_catalogue_and_rejects_unknown_items() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/store/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(12));

    let (status, _) = send(
        &app,
        Method::POST,
        "/store/redeem",
        Some(json!({ "patient_id": PATIENT, "item_id": 404 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn advisor_rejects_non_list_messages() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/health-advisor",
        Some(json!({ "messages": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid messages format");
}

#[tokio::test]
async fn malformed_path_and_body_get_json_errors() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::PUT,
        "/appointments/abc/status",
        Some(json!({ "status": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/prescriptions",
        Some(json!({ "patient_id": 123 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn diagnosis_with_delimiters_is_rejected() {
    let app = app();
    register(&app).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/prescriptions",
        Some(prescription("Diabetes, Type 2")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
