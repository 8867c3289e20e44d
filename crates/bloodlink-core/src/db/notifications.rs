//! Notification log database operations.

use rusqlite::{params, Row};

use super::{Database, DbResult};
use crate::models::{NotificationRecord, NotificationStatus};

fn row_to_notification(row: &Row<'_>) -> rusqlite::Result<NotificationRecord> {
    Ok(NotificationRecord {
        id: row.get(0)?,
        recipient_email: row.get(1)?,
        subject: row.get(2)?,
        message: row.get(3)?,
        status: row.get(4)?,
        sent_at: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl Database {
    /// Log one dispatch attempt. `sent_at` is stamped only for sent mail.
    pub fn record_notification(
        &self,
        recipient_email: &str,
        subject: &str,
        message: &str,
        status: NotificationStatus,
    ) -> DbResult<i64> {
        self.conn.execute(
            "INSERT INTO notifications (recipient_email, subject, message, status, sent_at)
             VALUES (?1, ?2, ?3, ?4,
                     CASE WHEN ?4 = 'sent' THEN datetime('now') ELSE NULL END)",
            params![recipient_email, subject, message, status],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent notification attempts.
    pub fn list_notifications(&self, limit: u32) -> DbResult<Vec<NotificationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recipient_email, subject, message, status, sent_at, created_at
             FROM notifications ORDER BY id DESC LIMIT ?",
        )?;
        let rows = stmt.query_map([limit], row_to_notification)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Attempt counts per outcome (analytics).
    pub fn notifications_by_status(&self) -> DbResult<Vec<(NotificationStatus, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM notifications GROUP BY status ORDER BY status",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
