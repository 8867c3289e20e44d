//! REST routes, one module per resource.

pub mod admin;
pub mod donor_auth;
pub mod donors;
pub mod requests;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use bloodlink_core::db::Page;

use crate::{error::ApiError, state::AppState};

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .nest("/admin", admin::router())
        .nest("/donors", donors::router())
        .nest("/requests", requests::router())
        .nest("/donor-auth", donor_auth::router())
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Server is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Validate pagination query parameters: page defaults to 1, limit to 20,
/// limit capped at 100.
pub(crate) fn page_params(page: Option<u32>, limit: Option<u32>) -> Result<Page, ApiError> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(20);

    if page < 1 {
        return Err(ApiError::BadRequest(
            "Page must be a positive integer".to_string(),
        ));
    }
    if !(1..=100).contains(&limit) {
        return Err(ApiError::BadRequest(
            "Limit must be between 1 and 100".to_string(),
        ));
    }
    Ok(Page { page, limit })
}

/// The pagination block of a list response.
pub(crate) fn pagination_json(page: Page, total: i64) -> Value {
    let limit = i64::from(page.limit);
    json!({
        "page": page.page,
        "limit": page.limit,
        "total": total,
        "total_pages": (total + limit - 1) / limit,
    })
}
