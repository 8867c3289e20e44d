//! Blood request endpoints. Creating a request triggers the matching
//! dispatcher after the row is persisted.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use bloodlink_core::db::RequestFilter;
use bloodlink_core::models::{BloodGroup, NewBloodRequest, RequestStatus};

use super::{page_params, pagination_json};
use crate::{auth::AdminAuth, error::ApiError, notify, state::AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_requests).post(create_request))
        .route("/{id}", get(get_request).delete(delete_request))
        .route("/{id}/status", put(update_status))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    status: Option<RequestStatus>,
    blood_group: Option<BloodGroup>,
    emergency: Option<bool>,
}

async fn list_requests(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = page_params(query.page, query.limit)?;
    let filter = RequestFilter {
        status: query.status,
        blood_group: query.blood_group,
        emergency: query.emergency,
    };

    let (requests, total) = state.db().list_requests(&filter, page)?;
    Ok(Json(json!({
        "success": true,
        "data": requests,
        "pagination": pagination_json(page, total),
    })))
}

async fn get_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let request = state
        .db()
        .get_request(id)?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;
    Ok(Json(json!({ "success": true, "data": request })))
}

async fn create_request(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewBloodRequest>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let request = {
        let db = state.db();
        let id = db.insert_request(&payload)?;
        db.get_request(id)?
            .ok_or_else(|| ApiError::Internal("request row missing after insert".into()))?
    };

    info!(
        "New blood request created: {} at {}",
        request.blood_group, request.hospital
    );

    // The response never waits on the notification burst.
    notify::spawn_match_notifications(state.clone(), request.clone());

    Ok(Json(json!({
        "success": true,
        "message": "Request created successfully",
        "id": request.id,
    })))
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    status: RequestStatus,
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Path(id): Path<i64>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<Value>, ApiError> {
    let db = state.db();
    let request = db
        .get_request(id)?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;

    if !request.status.can_transition_to(payload.status) {
        return Err(ApiError::Conflict(format!(
            "Cannot change status from {} to {}",
            request.status, payload.status
        )));
    }

    // Compare-and-set on the status we just read; a concurrent admin win
    // surfaces as a conflict instead of a silent illegal hop.
    if !db.update_request_status(id, request.status, payload.status)? {
        return Err(ApiError::Conflict(
            "Request status was changed by another admin".to_string(),
        ));
    }

    info!("Request {id} status updated to {}", payload.status);
    Ok(Json(json!({
        "success": true,
        "message": "Request status updated",
        "status": payload.status,
    })))
}

async fn delete_request(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !state.db().delete_request(id)? {
        return Err(ApiError::NotFound("Request not found".to_string()));
    }

    info!("Request deleted: ID {id}");
    Ok(Json(json!({ "success": true, "message": "Request deleted successfully" })))
}
