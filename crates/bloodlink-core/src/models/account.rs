//! Donor self-service account models.

use serde::Serialize;

use super::{BloodGroup, Donor};

/// Login lookup result: the donor's account joined with the donor identity
/// needed for the token and the login response.
#[derive(Debug, Clone)]
pub struct AccountWithDonor {
    pub id: i64,
    pub donor_id: i64,
    pub email: String,
    pub password_hash: String,
    pub fullname: String,
    pub blood_group: BloodGroup,
}

/// Profile payload: the donor row plus account metadata.
#[derive(Debug, Clone, Serialize)]
pub struct DonorProfile {
    #[serde(flatten)]
    pub donor: Donor,
    pub account_email: String,
    pub last_login: Option<String>,
}
