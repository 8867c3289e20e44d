//! Blood request models and the status transition graph.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::validate::{is_valid_phone, ValidationErrors, Validator};
use super::BloodGroup;

/// Lifecycle of a blood request.
///
/// Requests only move forward: a request is triaged out of `Pending` by an
/// admin and `Approved` requests can later be marked `Fulfilled`. `Rejected`
/// and `Fulfilled` are terminal. There is no path back to `Pending` and no
/// shortcut from `Pending` straight to `Fulfilled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Fulfilled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Fulfilled => "Fulfilled",
        }
    }

    /// Whether an admin may move a request from `self` to `next`.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Fulfilled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Rejected | RequestStatus::Fulfilled)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RequestStatus::Pending),
            "Approved" => Ok(RequestStatus::Approved),
            "Rejected" => Ok(RequestStatus::Rejected),
            "Fulfilled" => Ok(RequestStatus::Fulfilled),
            other => Err(format!("unrecognized request status: {other}")),
        }
    }
}

impl ToSql for RequestStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for RequestStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// A persisted blood request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BloodRequest {
    pub id: i64,
    pub patient_name: String,
    pub blood_group: BloodGroup,
    pub units: u32,
    pub hospital: String,
    pub phone: String,
    pub needed_date: NaiveDate,
    pub is_emergency: bool,
    pub status: RequestStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for filing a blood request. Requests always start `Pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBloodRequest {
    pub patient_name: String,
    pub blood_group: BloodGroup,
    pub units: u32,
    pub hospital: String,
    pub phone: String,
    pub needed_date: NaiveDate,
    #[serde(default)]
    pub is_emergency: bool,
}

impl NewBloodRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.require_len(&self.patient_name, "patient_name", 2, 100);
        v.require(
            (1..=20).contains(&self.units),
            "units",
            "Units must be between 1 and 20",
        );
        v.require_len(&self.hospital, "hospital", 2, 150);
        v.require(
            is_valid_phone(&self.phone),
            "phone",
            "Invalid phone number format",
        );
        v.finish()
    }
}
