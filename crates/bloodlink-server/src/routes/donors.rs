//! Donor endpoints: public search/registration plus admin record keeping.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use bloodlink_core::compat::{compatible_donor_groups, days_until_eligible, is_eligible};
use bloodlink_core::db::DonorFilter;
use bloodlink_core::models::{BloodGroup, NewDonation, NewDonor};

use super::{page_params, pagination_json};
use crate::{auth::AdminAuth, error::ApiError, notify, state::AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_donors))
        .route("/register", post(register_donor))
        .route("/compatible/{blood_group}", get(compatible_donors))
        .route(
            "/{id}",
            get(get_donor).put(update_donor).delete(delete_donor),
        )
        .route("/{id}/eligibility", get(donor_eligibility))
        .route("/{id}/availability", patch(update_availability))
        .route("/{id}/donations", post(record_donation))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    blood_group: Option<BloodGroup>,
    availability: Option<bool>,
    location: Option<String>,
}

async fn list_donors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = page_params(query.page, query.limit)?;
    let filter = DonorFilter {
        blood_group: query.blood_group,
        availability: query.availability,
        location: query.location,
    };

    let (donors, total) = state.db().list_donors(&filter, page)?;
    Ok(Json(json!({
        "success": true,
        "data": donors,
        "pagination": pagination_json(page, total),
    })))
}

async fn get_donor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let donor = state
        .db()
        .get_donor(id)?
        .ok_or_else(|| ApiError::NotFound("Donor not found".to_string()))?;
    Ok(Json(json!({ "success": true, "data": donor })))
}

async fn donor_eligibility(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let donor = state
        .db()
        .get_donor(id)?
        .ok_or_else(|| ApiError::NotFound("Donor not found".to_string()))?;

    let eligible = is_eligible(donor.last_donation_date);
    let days = days_until_eligible(donor.last_donation_date);
    let message = if eligible {
        "Eligible to donate".to_string()
    } else {
        format!("Not eligible. Can donate after {days} days")
    };

    Ok(Json(json!({
        "success": true,
        "data": {
            "eligible": eligible,
            "last_donation_date": donor.last_donation_date,
            "days_until_eligible": days,
            "message": message,
        },
    })))
}

/// Available donors who may donate to the given recipient group.
async fn compatible_donors(
    State(state): State<Arc<AppState>>,
    Path(blood_group): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let recipient: BloodGroup = blood_group
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid blood group".to_string()))?;

    let groups = compatible_donor_groups(recipient);
    let donors = state.db().available_donors_in_groups(groups)?;

    Ok(Json(json!({
        "success": true,
        "blood_group": recipient,
        "compatible_groups": groups,
        "data": donors,
    })))
}

async fn register_donor(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewDonor>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let id = state.db().insert_donor(&payload)?;
    info!("New donor registered: {}", payload.email);

    // Welcome email is fire-and-forget; registration already succeeded.
    notify::spawn_welcome_email(state.clone(), payload.email.clone(), payload.fullname.clone());

    Ok(Json(json!({
        "success": true,
        "message": "Donor registered successfully",
        "id": id,
    })))
}

async fn update_donor(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Path(id): Path<i64>,
    Json(payload): Json<NewDonor>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    if !state.db().update_donor(id, &payload)? {
        return Err(ApiError::NotFound("Donor not found".to_string()));
    }

    info!("Donor updated: ID {id}");
    Ok(Json(json!({ "success": true, "message": "Donor updated successfully" })))
}

#[derive(Debug, Deserialize)]
struct AvailabilityPayload {
    availability: bool,
}

async fn update_availability(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Path(id): Path<i64>,
    Json(payload): Json<AvailabilityPayload>,
) -> Result<Json<Value>, ApiError> {
    if !state.db().set_donor_availability(id, payload.availability)? {
        return Err(ApiError::NotFound("Donor not found".to_string()));
    }

    info!("Donor availability updated: ID {id}");
    Ok(Json(json!({ "success": true, "message": "Availability updated" })))
}

async fn delete_donor(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !state.db().delete_donor(id)? {
        return Err(ApiError::NotFound("Donor not found".to_string()));
    }

    info!("Donor deleted: ID {id}");
    Ok(Json(json!({ "success": true, "message": "Donor deleted successfully" })))
}

/// Record a completed donation and advance the donor's last donation date.
async fn record_donation(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Path(id): Path<i64>,
    Json(payload): Json<NewDonation>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let db = state.db();
    if db.get_donor(id)?.is_none() {
        return Err(ApiError::NotFound("Donor not found".to_string()));
    }
    let donation_id = db.insert_donation(id, &payload)?;
    db.set_last_donation_date(id, payload.donation_date)?;

    info!("Donation recorded for donor ID {id}");
    Ok(Json(json!({
        "success": true,
        "message": "Donation recorded successfully",
        "id": donation_id,
    })))
}
