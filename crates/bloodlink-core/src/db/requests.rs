//! Blood request database operations.

use rusqlite::{params, params_from_iter, types::ToSql, OptionalExtension, Row};

use super::{Database, DbResult, Page};
use crate::models::{BloodGroup, BloodRequest, NewBloodRequest, RequestStatus};

/// Filters for the request listing.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub blood_group: Option<BloodGroup>,
    pub emergency: Option<bool>,
}

const REQUEST_COLUMNS: &str = "id, patient_name, blood_group, units, hospital, phone,
       needed_date, is_emergency, status, created_at, updated_at";

fn row_to_request(row: &Row<'_>) -> rusqlite::Result<BloodRequest> {
    Ok(BloodRequest {
        id: row.get(0)?,
        patient_name: row.get(1)?,
        blood_group: row.get(2)?,
        units: row.get(3)?,
        hospital: row.get(4)?,
        phone: row.get(5)?,
        needed_date: row.get(6)?,
        is_emergency: row.get(7)?,
        status: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

impl Database {
    /// Insert a new request in `Pending` status. Returns the assigned id.
    pub fn insert_request(&self, request: &NewBloodRequest) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO blood_requests (
                patient_name, blood_group, units, hospital, phone, needed_date, is_emergency
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                request.patient_name,
                request.blood_group,
                request.units,
                request.hospital,
                request.phone,
                request.needed_date,
                request.is_emergency,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a request by id.
    pub fn get_request(&self, id: i64) -> DbResult<Option<BloodRequest>> {
        self.conn
            .query_row(
                &format!("SELECT {REQUEST_COLUMNS} FROM blood_requests WHERE id = ?"),
                [id],
                row_to_request,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List requests, emergencies first then newest. Returns the page of
    /// rows plus the total matching count.
    pub fn list_requests(
        &self,
        filter: &RequestFilter,
        page: Page,
    ) -> DbResult<(Vec<BloodRequest>, i64)> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            where_sql.push_str(" AND status = ?");
            args.push(Box::new(status));
        }
        if let Some(group) = filter.blood_group {
            where_sql.push_str(" AND blood_group = ?");
            args.push(Box::new(group));
        }
        if let Some(emergency) = filter.emergency {
            where_sql.push_str(" AND is_emergency = ?");
            args.push(Box::new(emergency));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM blood_requests{where_sql}"),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REQUEST_COLUMNS} FROM blood_requests{where_sql}
             ORDER BY is_emergency DESC, created_at DESC, id DESC
             LIMIT ? OFFSET ?"
        ))?;
        args.push(Box::new(page.limit));
        args.push(Box::new(page.offset()));

        let rows = stmt.query_map(params_from_iter(args.iter()), row_to_request)?;
        let requests = rows.collect::<Result<Vec<_>, _>>()?;
        Ok((requests, total))
    }

    /// Move a request from `from` to `to` as a compare-and-set, so two
    /// admins racing on the same request cannot produce an illegal hop.
    /// Returns false when the row no longer carries `from`.
    pub fn update_request_status(
        &self,
        id: i64,
        from: RequestStatus,
        to: RequestStatus,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE blood_requests SET status = ?1, updated_at = datetime('now')
             WHERE id = ?2 AND status = ?3",
            params![to, id, from],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a request.
    pub fn delete_request(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM blood_requests WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    pub fn count_requests(&self) -> DbResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM blood_requests", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn count_pending_requests(&self) -> DbResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM blood_requests WHERE status = 'Pending'",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    pub fn requests_by_blood_group(&self) -> DbResult<Vec<(BloodGroup, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT blood_group, COUNT(*) FROM blood_requests
             GROUP BY blood_group ORDER BY blood_group",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn requests_by_status(&self) -> DbResult<Vec<(RequestStatus, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM blood_requests GROUP BY status ORDER BY status",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
