//! Admin endpoints: login, analytics, admin-account management.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Local};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use bloodlink_core::models::validate::{check_password, Validator};
use bloodlink_core::models::{AdminRole, BloodGroup, NewAdmin};

use crate::{
    auth::{issue_admin_token, AdminAuth},
    error::ApiError,
    state::AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/analytics", get(analytics))
        .route("/users", get(list_admins).post(create_admin))
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    username: String,
    password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<Value>, ApiError> {
    let mut v = Validator::new();
    v.require(
        !payload.username.trim().is_empty(),
        "username",
        "Username is required",
    );
    v.require(!payload.password.is_empty(), "password", "Password is required");
    v.finish()?;

    let admin = state
        .db()
        .get_admin_by_username(&payload.username)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid =
        bcrypt::verify(&payload.password, &admin.password_hash).map_err(ApiError::internal)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = issue_admin_token(&state.config, &admin)?;
    info!("Admin login successful: {}", admin.username);

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "user": { "id": admin.id, "username": admin.username, "role": admin.role },
    })))
}

fn group_counts(counts: Vec<(BloodGroup, i64)>) -> Vec<Value> {
    counts
        .into_iter()
        .map(|(group, count)| json!({ "blood_group": group, "count": count }))
        .collect()
}

async fn analytics(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
) -> Result<Json<Value>, ApiError> {
    let db = state.db();
    let thirty_days_ago = Local::now().date_naive() - Duration::days(30);

    let data = json!({
        "total_donors": db.count_donors()?,
        "available_donors": db.count_available_donors()?,
        "total_requests": db.count_requests()?,
        "pending_requests": db.count_pending_requests()?,
        "donors_by_blood_group": group_counts(db.donors_by_blood_group()?),
        "requests_by_blood_group": group_counts(db.requests_by_blood_group()?),
        "requests_by_status": db
            .requests_by_status()?
            .into_iter()
            .map(|(status, count)| json!({ "status": status, "count": count }))
            .collect::<Vec<_>>(),
        "recent_donations": db.count_donations_since(thirty_days_ago)?,
        "notifications_by_status": db
            .notifications_by_status()?
            .into_iter()
            .map(|(status, count)| json!({ "status": status, "count": count }))
            .collect::<Vec<_>>(),
    });

    Ok(Json(json!({ "success": true, "data": data })))
}

async fn list_admins(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
) -> Result<Json<Value>, ApiError> {
    auth.require_super_admin()?;

    let admins = state.db().list_admins()?;
    Ok(Json(json!({ "success": true, "data": admins })))
}

#[derive(Debug, Deserialize)]
struct CreateAdminPayload {
    username: String,
    password: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<AdminRole>,
}

async fn create_admin(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    Json(payload): Json<CreateAdminPayload>,
) -> Result<Json<Value>, ApiError> {
    auth.require_super_admin()?;

    let mut v = Validator::new();
    v.require(
        !payload.username.trim().is_empty(),
        "username",
        "Username is required",
    );
    check_password(&mut v, &payload.password);
    v.finish()?;

    let password_hash =
        bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST).map_err(ApiError::internal)?;
    let admin = NewAdmin {
        username: payload.username,
        password_hash,
        email: payload.email,
        role: payload.role.unwrap_or(AdminRole::Admin),
    };

    let id = state.db().insert_admin(&admin)?;
    info!(
        "New admin created: {} by {}",
        admin.username,
        auth.0.username.as_deref().unwrap_or("unknown")
    );

    Ok(Json(json!({
        "success": true,
        "message": "Admin created successfully",
        "id": id,
    })))
}
