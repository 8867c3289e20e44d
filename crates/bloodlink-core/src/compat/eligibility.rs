//! Donor eligibility: the 90-day donation interval.
//!
//! Everything here works on whole calendar days. Eligibility and the
//! remaining-day count are both derived from the same `NaiveDate`
//! subtraction, so `is_eligible(d) == (days_until_eligible(d) == 0)` holds
//! at every boundary.

use chrono::{Duration, Local, NaiveDate};

/// Minimum calendar days between donations.
pub const DONATION_INTERVAL_DAYS: i64 = 90;

/// The first date on which a donor who last donated on `last` may donate
/// again.
pub fn eligible_date(last: NaiveDate) -> NaiveDate {
    last + Duration::days(DONATION_INTERVAL_DAYS)
}

/// Whether a donor is medically eligible on `today`. A donor with no
/// recorded donation is eligible immediately.
pub fn is_eligible_on(last: Option<NaiveDate>, today: NaiveDate) -> bool {
    match last {
        None => true,
        Some(last) => today >= eligible_date(last),
    }
}

/// Days remaining until the donor becomes eligible, as of `today`.
/// Zero exactly when [`is_eligible_on`] is true.
pub fn days_until_eligible_on(last: Option<NaiveDate>, today: NaiveDate) -> u32 {
    match last {
        None => 0,
        Some(last) => (eligible_date(last) - today).num_days().max(0) as u32,
    }
}

/// [`is_eligible_on`] against the current local date.
pub fn is_eligible(last: Option<NaiveDate>) -> bool {
    is_eligible_on(last, Local::now().date_naive())
}

/// [`days_until_eligible_on`] against the current local date.
pub fn days_until_eligible(last: Option<NaiveDate>) -> u32 {
    days_until_eligible_on(last, Local::now().date_naive())
}

/// The donor's next permitted donation date, if they have donated before.
pub fn next_donation_date(last: Option<NaiveDate>) -> Option<NaiveDate> {
    last.map(eligible_date)
}
