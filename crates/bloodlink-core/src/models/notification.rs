//! Notification log models.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Outcome of a single dispatch attempt.
///
/// `Pending` marks an attempt that was skipped because no mail transport is
/// configured. This log records attempts only; nothing retries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }
}

impl ToSql for NotificationStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for NotificationStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "pending" => Ok(NotificationStatus::Pending),
            "sent" => Ok(NotificationStatus::Sent),
            "failed" => Ok(NotificationStatus::Failed),
            other => Err(FromSqlError::Other(
                format!("unrecognized notification status: {other}").into(),
            )),
        }
    }
}

/// One row of the notification log.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NotificationRecord {
    pub id: i64,
    pub recipient_email: String,
    pub subject: String,
    pub message: String,
    pub status: NotificationStatus,
    pub sent_at: Option<String>,
    pub created_at: String,
}
