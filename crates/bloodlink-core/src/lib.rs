//! BloodLink Core Library
//!
//! Domain layer of a blood-donation registry: donors register their blood
//! group and availability, patients file blood requests, and the two are
//! matched through the ABO/Rh compatibility table.
//!
//! # Architecture
//!
//! ```text
//! Blood request ──▶ persisted row
//!                        │
//!                        ▼
//!            compatible_donor_groups(request.blood_group)
//!                        │
//!                        ▼
//!        donors WHERE blood_group IN (…) AND availability = 1
//!                        │
//!                        ▼
//!          one notification per donor (fire-and-forget,
//!          handled by the server crate's dispatcher)
//! ```
//!
//! Eligibility (90 days since the last donation) is always computed from
//! `last_donation_date`, never stored, and is independent of the
//! donor-controlled `availability` flag.
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer (donors, requests, admins, donations,
//!   donor accounts, notification log)
//! - [`models`]: Domain types (BloodGroup, Donor, BloodRequest, etc.)
//! - [`compat`]: Compatibility matrix and donor-eligibility calculator

pub mod compat;
pub mod db;
pub mod models;

// Re-export commonly used types
pub use compat::{
    can_donate, compatible_donor_groups, days_until_eligible, is_eligible, next_donation_date,
};
pub use db::Database;
pub use models::{
    Admin, AdminRole, BloodGroup, BloodRequest, Donation, Donor, Gender, NewBloodRequest,
    NewDonation, NewDonor, NotificationRecord, NotificationStatus, RequestStatus,
};
