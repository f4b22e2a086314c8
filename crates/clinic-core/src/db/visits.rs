//! Visit database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::query::{FilterField, FilterKind};
use super::{Database, DbError, DbResult, ListQuery, EntityQuery};
use crate::models::{ValidationError, Visit, VisitStatus};

const COLUMNS: &str =
    "v.id, v.patient_id, v.doctor_id, v.visit_datetime, v.reason, v.diagnosis, v.status";

pub(crate) const VISIT_QUERY: EntityQuery = EntityQuery {
    columns: COLUMNS,
    from: "visits v \
           JOIN patients p ON p.id = v.patient_id \
           JOIN doctors d ON d.id = v.doctor_id",
    pk: "v.id",
    search: &["v.reason", "v.diagnosis", "p.name", "d.surname"],
    filters: &[
        FilterField::new("patient", "v.patient_id", FilterKind::Integer),
        FilterField::new("doctor", "v.doctor_id", FilterKind::Integer),
        FilterField::new("status", "v.status", FilterKind::Text),
        FilterField::new("visit_date", "date(v.visit_datetime)", FilterKind::Date),
    ],
    ordering: &[
        ("visit_datetime", "v.visit_datetime"),
        ("status", "v.status"),
        ("id", "v.id"),
    ],
    default_order: "v.visit_datetime DESC, v.id DESC",
};

impl Database {
    /// Insert a new visit, returning its id.
    ///
    /// A diagnosis is only accepted on completed visits.
    pub fn insert_visit(&self, visit: &Visit) -> DbResult<i64> {
        visit.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO visits (
                patient_id, doctor_id, visit_datetime, reason, diagnosis, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                visit.patient_id,
                visit.doctor_id,
                visit.visit_datetime,
                visit.reason,
                visit.diagnosis,
                visit.status.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update an existing visit.
    ///
    /// A visit that already has treatments must stay completed with a
    /// diagnosis.
    pub fn update_visit(&self, visit: &Visit) -> DbResult<bool> {
        visit.validate()?;
        if !visit.is_treatable() && self.visit_has_treatments(visit.id)? {
            return Err(ValidationError::new(
                "status",
                "visit has treatments and must stay completed with a diagnosis",
            )
            .into());
        }
        let rows_affected = self.conn.execute(
            r#"
            UPDATE visits SET
                patient_id = ?2,
                doctor_id = ?3,
                visit_datetime = ?4,
                reason = ?5,
                diagnosis = ?6,
                status = ?7
            WHERE id = ?1
            "#,
            params![
                visit.id,
                visit.patient_id,
                visit.doctor_id,
                visit.visit_datetime,
                visit.reason,
                visit.diagnosis,
                visit.status.as_str(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a visit by id.
    pub fn get_visit(&self, id: i64) -> DbResult<Option<Visit>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM visits v WHERE v.id = ?", COLUMNS),
                [id],
                VisitRow::from_row,
            )
            .optional()?;

        row.map(Visit::try_from).transpose()
    }

    /// List visits matching a query.
    pub fn list_visits(&self, query: &ListQuery) -> DbResult<Vec<Visit>> {
        self.run_list(&VISIT_QUERY, query, VisitRow::from_row)?
            .into_iter()
            .map(Visit::try_from)
            .collect()
    }

    fn visit_has_treatments(&self, id: i64) -> DbResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM treatments WHERE visit_id = ? LIMIT 1", [id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    pub fn visit_ids(&self) -> DbResult<Vec<i64>> {
        self.ids_of("visits")
    }

    /// Delete a visit (cascades to treatments; lab reports keep the patient).
    pub fn delete_visit(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM visits WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    pub fn count_visits(&self) -> DbResult<usize> {
        self.count_table("visits")
    }

    pub fn delete_all_visits(&self) -> DbResult<usize> {
        self.clear_table("visits")
    }
}

/// Intermediate row struct for database mapping.
pub(crate) struct VisitRow {
    id: i64,
    patient_id: i64,
    doctor_id: i64,
    visit_datetime: DateTime<Utc>,
    reason: String,
    diagnosis: Option<String>,
    status: String,
}

impl VisitRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            doctor_id: row.get(2)?,
            visit_datetime: row.get(3)?,
            reason: row.get(4)?,
            diagnosis: row.get(5)?,
            status: row.get(6)?,
        })
    }
}

impl TryFrom<VisitRow> for Visit {
    type Error = DbError;

    fn try_from(row: VisitRow) -> Result<Self, Self::Error> {
        let status: VisitStatus = row
            .status
            .parse()
            .map_err(|_| DbError::Constraint(format!("Unknown visit status: {}", row.status)))?;

        Ok(Visit {
            id: row.id,
            patient_id: row.patient_id,
            doctor_id: row.doctor_id,
            visit_datetime: row.visit_datetime,
            reason: row.reason,
            diagnosis: row.diagnosis,
            status,
        })
    }
}
