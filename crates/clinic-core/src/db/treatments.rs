//! Treatment database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::query::{FilterField, FilterKind};
use super::{Database, DbResult, ListQuery, EntityQuery};
use crate::models::Treatment;

const COLUMNS: &str = "t.id, t.visit_id, t.description, t.duration_days, t.notes";

pub(crate) const TREATMENT_QUERY: EntityQuery = EntityQuery {
    columns: COLUMNS,
    from: "treatments t",
    pk: "t.id",
    search: &["t.description", "t.notes"],
    filters: &[
        FilterField::new("visit", "t.visit_id", FilterKind::Integer),
        FilterField::new("duration_days", "t.duration_days", FilterKind::Integer),
    ],
    ordering: &[("duration_days", "t.duration_days"), ("id", "t.id")],
    default_order: "t.id DESC",
};

pub(crate) fn treatment_from_row(row: &Row<'_>) -> rusqlite::Result<Treatment> {
    Ok(Treatment {
        id: row.get(0)?,
        visit_id: row.get(1)?,
        description: row.get(2)?,
        duration_days: row.get(3)?,
        notes: row.get(4)?,
    })
}

impl Database {
    /// Insert a new treatment, returning its id.
    ///
    /// The visit must be completed and carry a diagnosis; the schema
    /// trigger rejects anything else as a constraint violation.
    pub fn insert_treatment(&self, treatment: &Treatment) -> DbResult<i64> {
        treatment.validate()?;
        self.conn.execute(
            "INSERT INTO treatments (visit_id, description, duration_days, notes) VALUES (?1, ?2, ?3, ?4)",
            params![
                treatment.visit_id,
                treatment.description,
                treatment.duration_days,
                treatment.notes,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update an existing treatment.
    pub fn update_treatment(&self, treatment: &Treatment) -> DbResult<bool> {
        treatment.validate()?;
        let rows_affected = self.conn.execute(
            r#"
            UPDATE treatments SET
                visit_id = ?2,
                description = ?3,
                duration_days = ?4,
                notes = ?5
            WHERE id = ?1
            "#,
            params![
                treatment.id,
                treatment.visit_id,
                treatment.description,
                treatment.duration_days,
                treatment.notes,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a treatment by id.
    pub fn get_treatment(&self, id: i64) -> DbResult<Option<Treatment>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM treatments t WHERE t.id = ?", COLUMNS),
                [id],
                treatment_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List treatments matching a query.
    pub fn list_treatments(&self, query: &ListQuery) -> DbResult<Vec<Treatment>> {
        self.run_list(&TREATMENT_QUERY, query, treatment_from_row)
    }

    /// Treatments of one visit, in insertion order.
    pub fn list_treatments_for_visit(&self, visit_id: i64) -> DbResult<Vec<Treatment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM treatments t WHERE t.visit_id = ? ORDER BY t.id",
            COLUMNS
        ))?;
        let rows = stmt.query_map([visit_id], treatment_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn treatment_ids(&self) -> DbResult<Vec<i64>> {
        self.ids_of("treatments")
    }

    /// Delete a treatment (cascades to its prescriptions).
    pub fn delete_treatment(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM treatments WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    pub fn count_treatments(&self) -> DbResult<usize> {
        self.count_table("treatments")
    }

    pub fn delete_all_treatments(&self) -> DbResult<usize> {
        self.clear_table("treatments")
    }
}
