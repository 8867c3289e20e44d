//! Donor models.

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::validate::{is_valid_email, is_valid_phone, ValidationErrors, Validator};
use super::BloodGroup;

/// Donor gender as captured at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl ToSql for Gender {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Gender {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            other => Err(FromSqlError::Other(
                format!("unrecognized gender: {other}").into(),
            )),
        }
    }
}

/// A registered donor row.
///
/// `availability` is the donor-controlled "ready to donate right now" flag;
/// it is independent of medical eligibility, which is always computed from
/// `last_donation_date` (see [`crate::compat`]) and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Donor {
    pub id: i64,
    pub fullname: String,
    pub age: u32,
    pub gender: Gender,
    pub blood_group: BloodGroup,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub last_donation_date: Option<NaiveDate>,
    pub availability: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for registering a donor, and for the admin full-record update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDonor {
    pub fullname: String,
    pub age: u32,
    pub gender: Gender,
    pub blood_group: BloodGroup,
    pub phone: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub last_donation_date: Option<NaiveDate>,
    #[serde(default)]
    pub availability: Option<bool>,
}

impl NewDonor {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.require_len(&self.fullname, "fullname", 2, 100);
        v.require(
            (18..=65).contains(&self.age),
            "age",
            "Age must be between 18 and 65",
        );
        v.require(
            is_valid_phone(&self.phone),
            "phone",
            "Invalid phone number format",
        );
        v.require(is_valid_email(&self.email), "email", "Valid email is required");
        v.require_len(&self.address, "address", 5, 500);
        v.finish()
    }

    /// Donors are available unless they opt out at registration.
    pub fn availability_or_default(&self) -> bool {
        self.availability.unwrap_or(true)
    }
}

/// Partial self-service profile update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub fullname: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub availability: Option<bool>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.fullname.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.availability.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(fullname) = &self.fullname {
            v.require_len(fullname, "fullname", 2, 100);
        }
        if let Some(age) = self.age {
            v.require(
                (18..=65).contains(&age),
                "age",
                "Age must be between 18 and 65",
            );
        }
        if let Some(phone) = &self.phone {
            v.require(is_valid_phone(phone), "phone", "Invalid phone number format");
        }
        if let Some(address) = &self.address {
            v.require_len(address, "address", 5, 500);
        }
        v.finish()
    }
}
