//! Donation history database operations.

use chrono::NaiveDate;
use rusqlite::{params, Row};

use super::{Database, DbResult};
use crate::models::{Donation, NewDonation};

fn row_to_donation(row: &Row<'_>) -> rusqlite::Result<Donation> {
    Ok(Donation {
        id: row.get(0)?,
        donor_id: row.get(1)?,
        donation_date: row.get(2)?,
        location: row.get(3)?,
        units: row.get(4)?,
        notes: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl Database {
    /// Record a completed donation for a donor. Returns the assigned id.
    pub fn insert_donation(&self, donor_id: i64, donation: &NewDonation) -> DbResult<i64> {
        self.conn.execute(
            "INSERT INTO donations (donor_id, donation_date, location, units, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                donor_id,
                donation.donation_date,
                donation.location,
                donation.units,
                donation.notes,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// A donor's donation history, newest first.
    pub fn donations_for_donor(&self, donor_id: i64) -> DbResult<Vec<Donation>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, donor_id, donation_date, location, units, notes, created_at
             FROM donations WHERE donor_id = ?
             ORDER BY donation_date DESC, id DESC",
        )?;
        let rows = stmt.query_map([donor_id], row_to_donation)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Donations recorded on or after `since` (analytics).
    pub fn count_donations_since(&self, since: NaiveDate) -> DbResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM donations WHERE donation_date >= ?",
                params![since],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
