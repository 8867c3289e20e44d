//! Bearer-token authentication: JWT issue/verify plus the axum extractors
//! that gate admin and donor endpoints.
//!
//! Missing token ⇒ 401. Invalid, expired, or wrong-audience token ⇒ 403.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use bloodlink_core::models::{AccountWithDonor, Admin, AdminRole};

use crate::{config::Config, error::ApiError, state::AppState};

/// Which surface a token grants access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Admin,
    Donor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub kind: TokenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
}

fn expiry(config: &Config) -> i64 {
    (Utc::now() + Duration::hours(config.jwt_expiry_hours)).timestamp()
}

fn sign(config: &Config, claims: &Claims) -> Result<String, ApiError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(ApiError::internal)
}

pub fn issue_admin_token(config: &Config, admin: &Admin) -> Result<String, ApiError> {
    sign(
        config,
        &Claims {
            sub: admin.id,
            kind: TokenKind::Admin,
            username: Some(admin.username.clone()),
            role: Some(admin.role),
            donor_id: None,
            email: None,
            exp: expiry(config),
        },
    )
}

pub fn issue_donor_token(config: &Config, account: &AccountWithDonor) -> Result<String, ApiError> {
    sign(
        config,
        &Claims {
            sub: account.id,
            kind: TokenKind::Donor,
            username: None,
            role: None,
            donor_id: Some(account.donor_id),
            email: Some(account.email.clone()),
            exp: expiry(config),
        },
    )
}

pub fn verify_token(config: &Config, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Forbidden("Invalid or expired token".to_string()))
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
}

/// Extractor for admin-only endpoints.
pub struct AdminAuth(pub Claims);

impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify_token(&state.config, bearer_token(parts)?)?;
        if claims.kind != TokenKind::Admin {
            return Err(ApiError::Forbidden("Admin access only".to_string()));
        }
        Ok(Self(claims))
    }
}

impl AdminAuth {
    /// Guard for super-admin-only operations.
    pub fn require_super_admin(&self) -> Result<(), ApiError> {
        if self.0.role == Some(AdminRole::SuperAdmin) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Access denied. Super admin only.".to_string(),
            ))
        }
    }
}

/// Extractor for donor self-service endpoints.
pub struct DonorAuth(pub Claims);

impl DonorAuth {
    pub fn donor_id(&self) -> i64 {
        // Set unconditionally when the donor token is issued.
        self.0.donor_id.unwrap_or(self.0.sub)
    }
}

impl FromRequestParts<Arc<AppState>> for DonorAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify_token(&state.config, bearer_token(parts)?)?;
        if claims.kind != TokenKind::Donor {
            return Err(ApiError::Forbidden("Donor access only".to_string()));
        }
        Ok(Self(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloodlink_core::models::BloodGroup;

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

    fn test_admin() -> Admin {
        Admin {
            id: 7,
            username: "root".into(),
            password_hash: String::new(),
            email: None,
            role: AdminRole::SuperAdmin,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_admin_token_roundtrip() {
        let config = test_config();
        let token = issue_admin_token(&config, &test_admin()).unwrap();

        let claims = verify_token(&config, &token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.kind, TokenKind::Admin);
        assert_eq!(claims.username.as_deref(), Some("root"));
        assert_eq!(claims.role, Some(AdminRole::SuperAdmin));
    }

    #[test]
    fn test_donor_token_roundtrip() {
        let config = test_config();
        let account = AccountWithDonor {
            id: 3,
            donor_id: 11,
            email: "jane@example.com".into(),
            password_hash: String::new(),
            fullname: "Jane".into(),
            blood_group: BloodGroup::ONegative,
        };

        let token = issue_donor_token(&config, &account).unwrap();
        let claims = verify_token(&config, &token).unwrap();
        assert_eq!(claims.kind, TokenKind::Donor);
        assert_eq!(claims.donor_id, Some(11));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let config = test_config();
        let token = issue_admin_token(&config, &test_admin()).unwrap();

        let mut other = test_config();
        other.jwt_secret = "another-secret-another-secret-zzzz".into();
        assert!(matches!(
            verify_token(&other, &token),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            verify_token(&config, "not-a-token"),
            Err(ApiError::Forbidden(_))
        ));
    }
}
