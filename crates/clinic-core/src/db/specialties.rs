//! Specialty database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult, ListQuery, EntityQuery};
use crate::models::Specialty;

const COLUMNS: &str = "s.id, s.name, s.description";

pub(crate) const SPECIALTY_QUERY: EntityQuery = EntityQuery {
    columns: COLUMNS,
    from: "specialties s",
    pk: "s.id",
    search: &["s.name", "s.description"],
    filters: &[],
    ordering: &[("name", "s.name"), ("id", "s.id")],
    default_order: "s.name ASC",
};

fn specialty_from_row(row: &Row<'_>) -> rusqlite::Result<Specialty> {
    Ok(Specialty {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

impl Database {
    /// Insert a new specialty, returning its id.
    pub fn insert_specialty(&self, specialty: &Specialty) -> DbResult<i64> {
        specialty.validate()?;
        self.conn.execute(
            "INSERT INTO specialties (name, description) VALUES (?1, ?2)",
            params![specialty.name, specialty.description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update an existing specialty.
    pub fn update_specialty(&self, specialty: &Specialty) -> DbResult<bool> {
        specialty.validate()?;
        let rows_affected = self.conn.execute(
            "UPDATE specialties SET name = ?2, description = ?3 WHERE id = ?1",
            params![specialty.id, specialty.name, specialty.description],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a specialty by id.
    pub fn get_specialty(&self, id: i64) -> DbResult<Option<Specialty>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM specialties s WHERE s.id = ?", COLUMNS),
                [id],
                specialty_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List specialties matching a query.
    pub fn list_specialties(&self, query: &ListQuery) -> DbResult<Vec<Specialty>> {
        self.run_list(&SPECIALTY_QUERY, query, specialty_from_row)
    }

    /// Ids of all specialties, ascending.
    pub fn specialty_ids(&self) -> DbResult<Vec<i64>> {
        self.ids_of("specialties")
    }

    /// Delete a specialty (cascades to its doctors).
    pub fn delete_specialty(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM specialties WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    pub fn count_specialties(&self) -> DbResult<usize> {
        self.count_table("specialties")
    }

    pub fn delete_all_specialties(&self) -> DbResult<usize> {
        self.clear_table("specialties")
    }
}
