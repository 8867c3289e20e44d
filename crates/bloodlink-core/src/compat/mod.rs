//! Blood-group compatibility and donor eligibility.
//!
//! Two pure components used by the matching dispatcher and the public
//! search/eligibility endpoints:
//!
//! - [`matrix`]: the fixed ABO/Rh transfusion table
//! - [`eligibility`]: the 90-day donation-interval calculator
//!
//! Compatibility is always recomputed from the table; it is never cached or
//! persisted alongside a request, so a corrected table applies retroactively
//! to every historical request the next time it is queried.

mod eligibility;
mod matrix;

pub use eligibility::*;
pub use matrix::*;
