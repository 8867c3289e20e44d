//! Route-level tests driving the assembled app through tower.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use bloodlink_server::{app, config::Config, state::AppState};

fn test_config() -> Config {
    Config {
        port: 0,
        database_path: ":memory:".into(),
        jwt_secret: "test-secret-test-secret-test-secret!".into(),
        jwt_expiry_hours: 1,
        smtp_host: "localhost".into(),
        smtp_port: 587,
        smtp_user: None,
        smtp_password: None,
        email_from: "BloodLink <noreply@bloodlink.example>".into(),
        default_admin_username: "admin".into(),
        default_admin_password: "Admin@12345".into(),
    }
}

fn test_app() -> (Router, Arc<AppState>) {
    let state = AppState::with_config(test_config());
    (app(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_auth(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn donor_payload(name: &str, email: &str, group: &str) -> Value {
    json!({
        "fullname": name,
        "age": 30,
        "gender": "Other",
        "blood_group": group,
        "phone": "555 0100",
        "email": email,
        "address": "12 High Street, Springfield",
    })
}

fn request_payload(group: &str) -> Value {
    json!({
        "patient_name": "John Patient",
        "blood_group": group,
        "units": 2,
        "hospital": "General Hospital",
        "phone": "555 0100",
        "needed_date": "2025-06-01",
    })
}

async fn admin_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/admin/login",
            &json!({ "username": "admin", "password": "Admin@12345" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_alive() {
    let (app, _state) = test_app();

    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn donor_registration_and_lookup() {
    let (app, _state) = test_app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/donors/register",
            &donor_payload("Jane Donor", "jane@example.com", "O-"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let id = body["id"].as_i64().unwrap();

    // Duplicate email conflicts.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/donors/register",
            &donor_payload("Jane Again", "jane@example.com", "A+"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");

    let (status, body) = send(&app, get(&format!("/api/donors/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fullname"], "Jane Donor");
    assert_eq!(body["data"]["blood_group"], "O-");

    // Never donated: eligible immediately.
    let (status, body) = send(&app, get(&format!("/api/donors/{id}/eligibility"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["eligible"], true);
    assert_eq!(body["data"]["days_until_eligible"], 0);

    let (status, _) = send(&app, get("/api/donors/9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn registration_validation_reports_each_field() {
    let (app, _state) = test_app();

    let mut payload = donor_payload("J", "not-an-email", "O-");
    payload["age"] = json!(10);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/donors/register", &payload, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");

    let fields: Vec<_> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect();
    assert!(fields.contains(&"fullname".to_string()));
    assert!(fields.contains(&"age".to_string()));
    assert!(fields.contains(&"email".to_string()));
}

#[tokio::test]
async fn compatible_search_follows_the_table() {
    let (app, _state) = test_app();

    for (name, email, group) in [
        ("Olive", "olive@example.com", "O-"),
        ("Oscar", "oscar@example.com", "O+"),
        ("Abby", "abby@example.com", "AB-"),
    ] {
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/donors/register",
                &donor_payload(name, email, group),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, get("/api/donors/compatible/O-")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["compatible_groups"], json!(["O-"]));
    let donors = body["data"].as_array().unwrap();
    assert_eq!(donors.len(), 1);
    assert_eq!(donors[0]["fullname"], "Olive");

    let (status, body) = send(&app, get("/api/donors/compatible/XX")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid blood group");
}

#[tokio::test]
async fn admin_endpoints_require_valid_token() {
    let (app, _state) = test_app();

    let (status, _) = send(&app, get("/api/admin/analytics")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get_auth("/api/admin/analytics", "garbage")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let token = admin_token(&app).await;
    let (status, body) = send(&app, get_auth("/api/admin/analytics", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_donors"], 0);

    // Wrong credentials never leak which half was wrong.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/login",
            &json!({ "username": "admin", "password": "wrong" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn status_transitions_are_enforced() {
    let (app, _state) = test_app();
    let token = admin_token(&app).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/requests", &request_payload("AB+"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_i64().unwrap();

    // Pending -> Fulfilled skips triage and is rejected.
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/requests/{id}/status"),
            &json!({ "status": "Fulfilled" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Cannot change status from Pending to Fulfilled");

    // Unauthenticated transition attempts are refused outright.
    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/requests/{id}/status"),
            &json!({ "status": "Approved" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The legal path: Pending -> Approved -> Fulfilled.
    for step in ["Approved", "Fulfilled"] {
        let (status, _) = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/requests/{id}/status"),
                &json!({ "status": step }),
                Some(&token),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "transition to {step}");
    }

    let (status, body) = send(&app, get(&format!("/api/requests/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Fulfilled");

    // Terminal: nothing moves a fulfilled request.
    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/requests/{id}/status"),
            &json!({ "status": "Approved" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn donor_account_self_service_flow() {
    let (app, _state) = test_app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/donors/register",
            &donor_payload("Jane Donor", "jane@example.com", "B-"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let donor_id = body["id"].as_i64().unwrap();

    // Account registration requires a matching donor row.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/donor-auth/register",
            &json!({ "donor_id": 999, "email": "jane@example.com", "password": "Str0ng@pass" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/donor-auth/register",
            &json!({ "donor_id": donor_id, "email": "jane@example.com", "password": "Str0ng@pass" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/donor-auth/login",
            &json!({ "email": "jane@example.com", "password": "Str0ng@pass" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["donor"]["blood_group"], "B-");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get_auth("/api/donor-auth/profile", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["account_email"], "jane@example.com");

    // An admin token does not open donor endpoints.
    let admin = admin_token(&app).await;
    let (status, _) = send(&app, get_auth("/api/donor-auth/profile", &admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        json_request("PUT", "/api/donor-auth/profile", &json!({}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No fields to update");

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/donor-auth/profile",
            &json!({ "availability": false }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get_auth("/api/donor-auth/eligibility", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["eligible"], true);
    assert_eq!(body["data"]["next_donation_date"], Value::Null);

    let (status, body) = send(&app, get_auth("/api/donor-auth/donations", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn recording_a_donation_updates_eligibility() {
    let (app, _state) = test_app();
    let token = admin_token(&app).await;

    let (_, body) = send(
        &app,
        json_request(
            "POST",
            "/api/donors/register",
            &donor_payload("Jane Donor", "jane@example.com", "A+"),
            None,
        ),
    )
    .await;
    let donor_id = body["id"].as_i64().unwrap();

    let today = chrono::Local::now().date_naive();
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/donors/{donor_id}/donations"),
            &json!({ "donation_date": today, "location": "City Clinic" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get(&format!("/api/donors/{donor_id}/eligibility"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["eligible"], false);
    assert_eq!(body["data"]["days_until_eligible"], 90);
}

#[tokio::test]
async fn donor_listing_filters_and_paginates() {
    let (app, _state) = test_app();

    for i in 0..3 {
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/donors/register",
                &donor_payload(
                    &format!("Donor {i}"),
                    &format!("donor{i}@example.com"),
                    "A+",
                ),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, get("/api/donors?page=1&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);

    let (status, body) = send(&app, get("/api/donors?blood_group=A%2B")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 3);

    let (status, _) = send(&app, get("/api/donors?limit=500")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
