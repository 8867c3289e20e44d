//! SQLite schema definition.

/// Complete database schema for the registry.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Admin accounts
-- ============================================================================

CREATE TABLE IF NOT EXISTS admins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    email TEXT,
    role TEXT NOT NULL DEFAULT 'admin' CHECK (role IN ('super_admin', 'admin')),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Donors
-- ============================================================================

CREATE TABLE IF NOT EXISTS donors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    fullname TEXT NOT NULL,
    age INTEGER NOT NULL,
    gender TEXT NOT NULL CHECK (gender IN ('Male', 'Female', 'Other')),
    blood_group TEXT NOT NULL
        CHECK (blood_group IN ('A+', 'A-', 'B+', 'B-', 'AB+', 'AB-', 'O+', 'O-')),
    phone TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    address TEXT NOT NULL,
    last_donation_date TEXT,                      -- ISO date, NULL until first donation
    availability INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_donors_blood_group ON donors(blood_group);
CREATE INDEX IF NOT EXISTS idx_donors_availability ON donors(availability);

-- ============================================================================
-- Blood requests
-- ============================================================================

CREATE TABLE IF NOT EXISTS blood_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_name TEXT NOT NULL,
    blood_group TEXT NOT NULL
        CHECK (blood_group IN ('A+', 'A-', 'B+', 'B-', 'AB+', 'AB-', 'O+', 'O-')),
    units INTEGER NOT NULL,
    hospital TEXT NOT NULL,
    phone TEXT NOT NULL,
    needed_date TEXT NOT NULL,
    is_emergency INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'Pending'
        CHECK (status IN ('Pending', 'Approved', 'Rejected', 'Fulfilled')),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_requests_blood_group ON blood_requests(blood_group);
CREATE INDEX IF NOT EXISTS idx_requests_status ON blood_requests(status);
CREATE INDEX IF NOT EXISTS idx_requests_emergency ON blood_requests(is_emergency);

-- ============================================================================
-- Donation history
-- ============================================================================

CREATE TABLE IF NOT EXISTS donations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    donor_id INTEGER NOT NULL REFERENCES donors(id) ON DELETE CASCADE,
    donation_date TEXT NOT NULL,
    location TEXT NOT NULL,
    units INTEGER NOT NULL DEFAULT 1,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_donations_donor ON donations(donor_id);

-- ============================================================================
-- Donor self-service accounts
-- ============================================================================

CREATE TABLE IF NOT EXISTS donor_accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    donor_id INTEGER NOT NULL UNIQUE REFERENCES donors(id) ON DELETE CASCADE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    last_login TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Notification log (attempts only; nothing retries these)
-- ============================================================================

CREATE TABLE IF NOT EXISTS notifications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    recipient_email TEXT NOT NULL,
    subject TEXT NOT NULL,
    message TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'sent', 'failed')),
    sent_at TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_donor_email_unique() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let insert = "INSERT INTO donors (fullname, age, gender, blood_group, phone, email, address)
                      VALUES (?, ?, ?, ?, ?, ?, ?)";
        conn.execute(
            insert,
            rusqlite::params!["Jane", 30, "Female", "O-", "555", "jane@example.com", "12 High St"],
        )
        .unwrap();

        let result = conn.execute(
            insert,
            rusqlite::params!["Janet", 31, "Female", "A+", "556", "jane@example.com", "13 High St"],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_status_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO blood_requests (patient_name, blood_group, units, hospital, phone, needed_date, status)
             VALUES ('P', 'A+', 1, 'H', '555', '2025-01-01', 'Archived')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_donation_cascade_on_donor_delete() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO donors (fullname, age, gender, blood_group, phone, email, address)
             VALUES ('Jane', 30, 'Female', 'O-', '555', 'jane@example.com', '12 High St')",
            [],
        )
        .unwrap();
        let donor_id = conn.last_insert_rowid();

        conn.execute(
            "INSERT INTO donations (donor_id, donation_date, location) VALUES (?, '2025-01-01', 'City Clinic')",
            [donor_id],
        )
        .unwrap();

        conn.execute("DELETE FROM donors WHERE id = ?", [donor_id]).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM donations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
