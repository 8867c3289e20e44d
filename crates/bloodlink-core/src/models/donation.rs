//! Donation history models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::validate::{ValidationErrors, Validator};

/// A completed donation on a donor's record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Donation {
    pub id: i64,
    pub donor_id: i64,
    pub donation_date: NaiveDate,
    pub location: String,
    pub units: u32,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Payload for recording a completed donation against a donor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDonation {
    pub donation_date: NaiveDate,
    pub location: String,
    #[serde(default = "default_units")]
    pub units: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_units() -> u32 {
    1
}

impl NewDonation {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.require_len(&self.location, "location", 2, 150);
        v.require(
            (1..=20).contains(&self.units),
            "units",
            "Units must be between 1 and 20",
        );
        v.finish()
    }
}
