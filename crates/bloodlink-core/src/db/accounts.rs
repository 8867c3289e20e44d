//! Donor self-service account database operations.

use rusqlite::{params, OptionalExtension};

use super::{map_unique, Database, DbResult};
use crate::models::{AccountWithDonor, Donor, DonorProfile};

impl Database {
    /// Whether a donor row exists with this id and email, the precondition
    /// for opening an account.
    pub fn donor_matches(&self, donor_id: i64, email: &str) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM donors WHERE id = ? AND email = ?",
            params![donor_id, email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Whether an account already exists for this donor or email.
    pub fn account_exists(&self, donor_id: i64, email: &str) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM donor_accounts WHERE donor_id = ? OR email = ?",
            params![donor_id, email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Create a login account for a donor. Returns the assigned id.
    pub fn insert_account(&self, donor_id: i64, email: &str, password_hash: &str) -> DbResult<i64> {
        self.conn
            .execute(
                "INSERT INTO donor_accounts (donor_id, email, password_hash) VALUES (?1, ?2, ?3)",
                params![donor_id, email, password_hash],
            )
            .map_err(|e| map_unique(e, "account"))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Look up an account (joined with the donor identity) for login.
    pub fn get_account_for_login(&self, email: &str) -> DbResult<Option<AccountWithDonor>> {
        self.conn
            .query_row(
                "SELECT da.id, da.donor_id, da.email, da.password_hash, d.fullname, d.blood_group
                 FROM donor_accounts da
                 JOIN donors d ON da.donor_id = d.id
                 WHERE da.email = ?",
                [email],
                |row| {
                    Ok(AccountWithDonor {
                        id: row.get(0)?,
                        donor_id: row.get(1)?,
                        email: row.get(2)?,
                        password_hash: row.get(3)?,
                        fullname: row.get(4)?,
                        blood_group: row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Stamp a successful login.
    pub fn touch_last_login(&self, account_id: i64) -> DbResult<()> {
        self.conn.execute(
            "UPDATE donor_accounts SET last_login = datetime('now') WHERE id = ?",
            [account_id],
        )?;
        Ok(())
    }

    /// The donor's profile: donor row plus account metadata.
    pub fn get_donor_profile(&self, donor_id: i64) -> DbResult<Option<DonorProfile>> {
        self.conn
            .query_row(
                "SELECT d.id, d.fullname, d.age, d.gender, d.blood_group, d.phone, d.email,
                        d.address, d.last_donation_date, d.availability, d.created_at,
                        d.updated_at, da.email, da.last_login
                 FROM donors d
                 JOIN donor_accounts da ON d.id = da.donor_id
                 WHERE d.id = ?",
                [donor_id],
                |row| {
                    Ok(DonorProfile {
                        donor: Donor {
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
                        },
                        account_email: row.get(12)?,
                        last_login: row.get(13)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }
}
