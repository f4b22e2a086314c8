//! Lab report database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::query::{FilterField, FilterKind};
use super::{Database, DbResult, ListQuery, EntityQuery};
use crate::models::LabReport;

const COLUMNS: &str = "l.id, l.patient_id, l.visit_id, l.exam_type, l.requested_on, \
                       l.result_on, l.results, l.analysed_by";

pub(crate) const LAB_REPORT_QUERY: EntityQuery = EntityQuery {
    columns: COLUMNS,
    from: "lab_reports l \
           JOIN patients p ON p.id = l.patient_id \
           LEFT JOIN visits v ON v.id = l.visit_id",
    pk: "l.id",
    search: &[
        "l.exam_type",
        "l.results",
        "l.analysed_by",
        "p.name",
        "p.surname",
        "v.reason",
    ],
    filters: &[
        FilterField::new("patient", "l.patient_id", FilterKind::Integer),
        FilterField::new("visit", "l.visit_id", FilterKind::Integer),
        FilterField::new("exam_type", "l.exam_type", FilterKind::Text),
        FilterField::new("requested_on", "l.requested_on", FilterKind::Date),
        FilterField::new("result_on", "l.result_on", FilterKind::Date),
    ],
    ordering: &[
        ("requested_on", "l.requested_on"),
        ("result_on", "l.result_on"),
        ("exam_type", "l.exam_type"),
        ("patient_surname", "p.surname"),
        ("patient_name", "p.name"),
        ("id", "l.id"),
    ],
    default_order: "l.requested_on DESC, l.id DESC",
};

pub(crate) fn lab_report_from_row(row: &Row<'_>) -> rusqlite::Result<LabReport> {
    Ok(LabReport {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        visit_id: row.get(2)?,
        exam_type: row.get(3)?,
        requested_on: row.get(4)?,
        result_on: row.get(5)?,
        results: row.get(6)?,
        analysed_by: row.get(7)?,
    })
}

impl Database {
    /// Insert a new lab report, returning its id.
    pub fn insert_lab_report(&self, report: &LabReport) -> DbResult<i64> {
        report.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO lab_reports (
                patient_id, visit_id, exam_type, requested_on,
                result_on, results, analysed_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                report.patient_id,
                report.visit_id,
                report.exam_type,
                report.requested_on,
                report.result_on,
                report.results,
                report.analysed_by,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update an existing lab report.
    pub fn update_lab_report(&self, report: &LabReport) -> DbResult<bool> {
        report.validate()?;
        let rows_affected = self.conn.execute(
            r#"
            UPDATE lab_reports SET
                patient_id = ?2,
                visit_id = ?3,
                exam_type = ?4,
                requested_on = ?5,
                result_on = ?6,
                results = ?7,
                analysed_by = ?8
            WHERE id = ?1
            "#,
            params![
                report.id,
                report.patient_id,
                report.visit_id,
                report.exam_type,
                report.requested_on,
                report.result_on,
                report.results,
                report.analysed_by,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a lab report by id.
    pub fn get_lab_report(&self, id: i64) -> DbResult<Option<LabReport>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM lab_reports l WHERE l.id = ?", COLUMNS),
                [id],
                lab_report_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List lab reports matching a query.
    pub fn list_lab_reports(&self, query: &ListQuery) -> DbResult<Vec<LabReport>> {
        self.run_list(&LAB_REPORT_QUERY, query, lab_report_from_row)
    }

    pub fn lab_report_ids(&self) -> DbResult<Vec<i64>> {
        self.ids_of("lab_reports")
    }

    pub fn delete_lab_report(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM lab_reports WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    pub fn count_lab_reports(&self) -> DbResult<usize> {
        self.count_table("lab_reports")
    }

    pub fn delete_all_lab_reports(&self) -> DbResult<usize> {
        self.clear_table("lab_reports")
    }
}
