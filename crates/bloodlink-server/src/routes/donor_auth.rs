//! Donor self-service endpoints: account registration, login, profile,
//! donation history, eligibility.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use bloodlink_core::compat::{days_until_eligible, is_eligible, next_donation_date};
use bloodlink_core::models::validate::{check_password, is_valid_email, Validator};
use bloodlink_core::models::ProfileUpdate;

use crate::{
    auth::{issue_donor_token, DonorAuth},
    error::ApiError,
    state::AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile).put(update_profile))
        .route("/donations", get(donations))
        .route("/eligibility", get(eligibility))
}

#[derive(Debug, Deserialize)]
struct RegisterPayload {
    donor_id: i64,
    email: String,
    password: String,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<Value>, ApiError> {
    let mut v = Validator::new();
    v.require(is_valid_email(&payload.email), "email", "Valid email required");
    check_password(&mut v, &payload.password);
    v.finish()?;

    let password_hash =
        bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST).map_err(ApiError::internal)?;

    let db = state.db();
    if !db.donor_matches(payload.donor_id, &payload.email)? {
        return Err(ApiError::NotFound(
            "Donor not found. Please register as donor first.".to_string(),
        ));
    }
    if db.account_exists(payload.donor_id, &payload.email)? {
        return Err(ApiError::Conflict("Account already exists".to_string()));
    }

    let id = db.insert_account(payload.donor_id, &payload.email, &password_hash)?;
    info!("Donor account created: {}", payload.email);

    Ok(Json(json!({
        "success": true,
        "message": "Account created successfully. Please login.",
        "id": id,
    })))
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<Value>, ApiError> {
    let mut v = Validator::new();
    v.require(is_valid_email(&payload.email), "email", "Valid email required");
    v.require(!payload.password.is_empty(), "password", "Password required");
    v.finish()?;

    let account = state
        .db()
        .get_account_for_login(&payload.email)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid =
        bcrypt::verify(&payload.password, &account.password_hash).map_err(ApiError::internal)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = issue_donor_token(&state.config, &account)?;
    state.db().touch_last_login(account.id)?;
    info!("Donor login: {}", account.email);

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "donor": {
            "id": account.donor_id,
            "name": account.fullname,
            "blood_group": account.blood_group,
        },
    })))
}

async fn profile(
    State(state): State<Arc<AppState>>,
    auth: DonorAuth,
) -> Result<Json<Value>, ApiError> {
    let profile = state
        .db()
        .get_donor_profile(auth.donor_id())?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": profile })))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth: DonorAuth,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Value>, ApiError> {
    update.validate()?;
    if update.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    if !state.db().update_donor_profile(auth.donor_id(), &update)? {
        return Err(ApiError::NotFound("Donor not found".to_string()));
    }

    info!("Donor profile updated: ID {}", auth.donor_id());
    Ok(Json(json!({ "success": true, "message": "Profile updated successfully" })))
}

async fn donations(
    State(state): State<Arc<AppState>>,
    auth: DonorAuth,
) -> Result<Json<Value>, ApiError> {
    let history = state.db().donations_for_donor(auth.donor_id())?;
    Ok(Json(json!({ "success": true, "data": history })))
}

async fn eligibility(
    State(state): State<Arc<AppState>>,
    auth: DonorAuth,
) -> Result<Json<Value>, ApiError> {
    let donor = state
        .db()
        .get_donor(auth.donor_id())?
        .ok_or_else(|| ApiError::NotFound("Donor not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "eligible": is_eligible(donor.last_donation_date),
            "last_donation_date": donor.last_donation_date,
            "days_until_eligible": days_until_eligible(donor.last_donation_date),
            "next_donation_date": next_donation_date(donor.last_donation_date),
        },
    })))
}
