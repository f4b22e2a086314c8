//! Prescription database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::query::{FilterField, FilterKind};
use super::{Database, DbResult, ListQuery, EntityQuery};
use crate::models::Prescription;

const COLUMNS: &str =
    "rx.id, rx.treatment_id, rx.medication_id, rx.dosage, rx.frequency, rx.duration";

pub(crate) const PRESCRIPTION_QUERY: EntityQuery = EntityQuery {
    columns: COLUMNS,
    from: "prescriptions rx JOIN medications m ON m.id = rx.medication_id",
    pk: "rx.id",
    search: &["rx.dosage", "rx.frequency", "rx.duration", "m.name"],
    filters: &[
        FilterField::new("treatment", "rx.treatment_id", FilterKind::Integer),
        FilterField::new("medication", "rx.medication_id", FilterKind::Integer),
    ],
    ordering: &[
        ("id", "rx.id"),
        ("treatment", "rx.treatment_id"),
        ("medication_name", "m.name"),
    ],
    default_order: "rx.id DESC",
};

pub(crate) fn prescription_from_row(row: &Row<'_>) -> rusqlite::Result<Prescription> {
    Ok(Prescription {
        id: row.get(0)?,
        treatment_id: row.get(1)?,
        medication_id: row.get(2)?,
        dosage: row.get(3)?,
        frequency: row.get(4)?,
        duration: row.get(5)?,
    })
}

impl Database {
    /// Insert a new prescription, returning its id.
    ///
    /// A medication appears at most once per treatment.
    pub fn insert_prescription(&self, prescription: &Prescription) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO prescriptions (
                treatment_id, medication_id, dosage, frequency, duration
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                prescription.treatment_id,
                prescription.medication_id,
                prescription.dosage,
                prescription.frequency,
                prescription.duration,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update an existing prescription.
    pub fn update_prescription(&self, prescription: &Prescription) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE prescriptions SET
                treatment_id = ?2,
                medication_id = ?3,
                dosage = ?4,
                frequency = ?5,
                duration = ?6
            WHERE id = ?1
            "#,
            params![
                prescription.id,
                prescription.treatment_id,
                prescription.medication_id,
                prescription.dosage,
                prescription.frequency,
                prescription.duration,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a prescription by id.
    pub fn get_prescription(&self, id: i64) -> DbResult<Option<Prescription>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM prescriptions rx WHERE rx.id = ?", COLUMNS),
                [id],
                prescription_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List prescriptions matching a query.
    pub fn list_prescriptions(&self, query: &ListQuery) -> DbResult<Vec<Prescription>> {
        self.run_list(&PRESCRIPTION_QUERY, query, prescription_from_row)
    }

    /// Prescriptions of one treatment, in insertion order.
    pub fn list_prescriptions_for_treatment(&self, treatment_id: i64) -> DbResult<Vec<Prescription>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM prescriptions rx WHERE rx.treatment_id = ? ORDER BY rx.id",
            COLUMNS
        ))?;
        let rows = stmt.query_map([treatment_id], prescription_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn prescription_ids(&self) -> DbResult<Vec<i64>> {
        self.ids_of("prescriptions")
    }

    pub fn delete_prescription(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM prescriptions WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    pub fn count_prescriptions(&self) -> DbResult<usize> {
        self.count_table("prescriptions")
    }

    pub fn delete_all_prescriptions(&self) -> DbResult<usize> {
        self.clear_table("prescriptions")
    }
}
