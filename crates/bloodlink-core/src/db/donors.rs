//! Donor database operations.

use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, types::ToSql, OptionalExtension, Row};

use super::{map_unique, Database, DbResult, Page};
use crate::models::{BloodGroup, Donor, NewDonor, ProfileUpdate};

/// Filters for the donor listing.
#[derive(Debug, Clone, Default)]
pub struct DonorFilter {
    pub blood_group: Option<BloodGroup>,
    pub availability: Option<bool>,
    /// Substring match on the address.
    pub location: Option<String>,
}

const DONOR_COLUMNS: &str = "id, fullname, age, gender, blood_group, phone, email, address,
       last_donation_date, availability, created_at, updated_at";

fn row_to_donor(row: &Row<'_>) -> rusqlite::Result<Donor> {
    Ok(Donor {
        id: row.get(0)?,
        fullname: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        blood_group: row.get(4)?,
        phone: row.get(5)?,
        email: row.get(6)?,
        address: row.get(7)?,
        last_donation_date: row.get(8)?,
        availability: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

impl Database {
    /// Insert a new donor. Returns the assigned id.
    pub fn insert_donor(&self, donor: &NewDonor) -> DbResult<i64> {
        self.conn
            .execute(
                r#"
                INSERT INTO donors (
                    fullname, age, gender, blood_group, phone, email, address,
                    last_donation_date, availability
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    donor.fullname,
                    donor.age,
                    donor.gender,
                    donor.blood_group,
                    donor.phone,
                    donor.email,
                    donor.address,
                    donor.last_donation_date,
                    donor.availability_or_default(),
                ],
            )
            .map_err(|e| map_unique(e, "email"))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a donor by id.
    pub fn get_donor(&self, id: i64) -> DbResult<Option<Donor>> {
        self.conn
            .query_row(
                &format!("SELECT {DONOR_COLUMNS} FROM donors WHERE id = ?"),
                [id],
                row_to_donor,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List donors with optional filters, newest first. Returns the page of
    /// rows plus the total matching count.
    pub fn list_donors(&self, filter: &DonorFilter, page: Page) -> DbResult<(Vec<Donor>, i64)> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(group) = filter.blood_group {
            where_sql.push_str(" AND blood_group = ?");
            args.push(Box::new(group));
        }
        if let Some(available) = filter.availability {
            where_sql.push_str(" AND availability = ?");
            args.push(Box::new(available));
        }
        if let Some(location) = &filter.location {
            where_sql.push_str(" AND address LIKE ?");
            args.push(Box::new(format!("%{location}%")));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM donors{where_sql}"),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DONOR_COLUMNS} FROM donors{where_sql}
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?"
        ))?;
        args.push(Box::new(page.limit));
        args.push(Box::new(page.offset()));

        let rows = stmt.query_map(params_from_iter(args.iter()), row_to_donor)?;
        let donors = rows.collect::<Result<Vec<_>, _>>()?;
        Ok((donors, total))
    }

    /// Available donors whose blood group is in `groups`: the matching pool
    /// for a request. Empty `groups` yields no donors.
    pub fn available_donors_in_groups(&self, groups: &[BloodGroup]) -> DbResult<Vec<Donor>> {
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; groups.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DONOR_COLUMNS} FROM donors
             WHERE blood_group IN ({placeholders}) AND availability = 1
             ORDER BY created_at DESC, id DESC"
        ))?;

        let rows = stmt.query_map(params_from_iter(groups.iter()), row_to_donor)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Replace a donor's record.
    pub fn update_donor(&self, id: i64, donor: &NewDonor) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute(
                r#"
                UPDATE donors SET
                    fullname = ?2,
                    age = ?3,
                    gender = ?4,
                    blood_group = ?5,
                    phone = ?6,
                    email = ?7,
                    address = ?8,
                    last_donation_date = ?9,
                    availability = ?10,
                    updated_at = datetime('now')
                WHERE id = ?1
                "#,
                params![
                    id,
                    donor.fullname,
                    donor.age,
                    donor.gender,
                    donor.blood_group,
                    donor.phone,
                    donor.email,
                    donor.address,
                    donor.last_donation_date,
                    donor.availability_or_default(),
                ],
            )
            .map_err(|e| map_unique(e, "email"))?;
        Ok(rows_affected > 0)
    }

    /// Apply a partial self-service profile update. Returns false when the
    /// update is empty or the donor does not exist.
    pub fn update_donor_profile(&self, donor_id: i64, update: &ProfileUpdate) -> DbResult<bool> {
        let mut sets: Vec<&str> = Vec::new();
        let mut args: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(fullname) = &update.fullname {
            sets.push("fullname = ?");
            args.push(Box::new(fullname.clone()));
        }
        if let Some(age) = update.age {
            sets.push("age = ?");
            args.push(Box::new(age));
        }
        if let Some(gender) = update.gender {
            sets.push("gender = ?");
            args.push(Box::new(gender));
        }
        if let Some(phone) = &update.phone {
            sets.push("phone = ?");
            args.push(Box::new(phone.clone()));
        }
        if let Some(address) = &update.address {
            sets.push("address = ?");
            args.push(Box::new(address.clone()));
        }
        if let Some(availability) = update.availability {
            sets.push("availability = ?");
            args.push(Box::new(availability));
        }

        if sets.is_empty() {
            return Ok(false);
        }
        sets.push("updated_at = datetime('now')");
        args.push(Box::new(donor_id));

        let sql = format!("UPDATE donors SET {} WHERE id = ?", sets.join(", "));
        let rows_affected = self.conn.execute(&sql, params_from_iter(args.iter()))?;
        Ok(rows_affected > 0)
    }

    /// Flip a donor's availability flag.
    pub fn set_donor_availability(&self, id: i64, availability: bool) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE donors SET availability = ?, updated_at = datetime('now') WHERE id = ?",
            params![availability, id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Advance a donor's last donation date (after recording a donation).
    pub fn set_last_donation_date(&self, id: i64, date: NaiveDate) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE donors SET last_donation_date = ?, updated_at = datetime('now') WHERE id = ?",
            params![date, id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a donor.
    pub fn delete_donor(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM donors WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    pub fn count_donors(&self) -> DbResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM donors", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn count_available_donors(&self) -> DbResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM donors WHERE availability = 1",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    pub fn donors_by_blood_group(&self) -> DbResult<Vec<(BloodGroup, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT blood_group, COUNT(*) FROM donors GROUP BY blood_group ORDER BY blood_group",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
