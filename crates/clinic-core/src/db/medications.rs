//! Medication database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult, ListQuery, EntityQuery};
use crate::models::Medication;

const COLUMNS: &str = "m.id, m.name, m.manufacturer, m.stock, m.unit_price";

pub(crate) const MEDICATION_QUERY: EntityQuery = EntityQuery {
    columns: COLUMNS,
    from: "medications m",
    pk: "m.id",
    search: &["m.name", "m.manufacturer"],
    filters: &[],
    ordering: &[
        ("name", "m.name"),
        ("manufacturer", "m.manufacturer"),
        ("stock", "m.stock"),
        ("unit_price", "m.unit_price"),
        ("id", "m.id"),
    ],
    default_order: "m.name ASC",
};

pub(crate) fn medication_from_row(row: &Row<'_>) -> rusqlite::Result<Medication> {
    Ok(Medication {
        id: row.get(0)?,
        name: row.get(1)?,
        manufacturer: row.get(2)?,
        stock: row.get(3)?,
        unit_price: row.get(4)?,
    })
}

impl Database {
    /// Insert a new medication, returning its id.
    pub fn insert_medication(&self, medication: &Medication) -> DbResult<i64> {
        medication.validate()?;
        self.conn.execute(
            "INSERT INTO medications (name, manufacturer, stock, unit_price) VALUES (?1, ?2, ?3, ?4)",
            params![
                medication.name,
                medication.manufacturer,
                medication.stock,
                medication.unit_price,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update an existing medication.
    pub fn update_medication(&self, medication: &Medication) -> DbResult<bool> {
        medication.validate()?;
        let rows_affected = self.conn.execute(
            r#"
            UPDATE medications SET
                name = ?2,
                manufacturer = ?3,
                stock = ?4,
                unit_price = ?5
            WHERE id = ?1
            "#,
            params![
                medication.id,
                medication.name,
                medication.manufacturer,
                medication.stock,
                medication.unit_price,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a medication by id.
    pub fn get_medication(&self, id: i64) -> DbResult<Option<Medication>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM medications m WHERE m.id = ?", COLUMNS),
                [id],
                medication_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List medications matching a query.
    pub fn list_medications(&self, query: &ListQuery) -> DbResult<Vec<Medication>> {
        self.run_list(&MEDICATION_QUERY, query, medication_from_row)
    }

    /// Ids of all medications, ascending.
    pub fn medication_ids(&self) -> DbResult<Vec<i64>> {
        self.ids_of("medications")
    }

    /// Delete a medication (cascades to prescriptions using it).
    pub fn delete_medication(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM medications WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    pub fn count_medications(&self) -> DbResult<usize> {
        self.count_table("medications")
    }

    pub fn delete_all_medications(&self) -> DbResult<usize> {
        self.clear_table("medications")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        for (name, manufacturer, stock, price) in [
            ("Paracetamol", "Laboratorio Chile", 100, 3500.0),
            ("Ibuprofen", "Recalcine", 75, 5200.5),
            ("Salbutamol", "GSK", 30, 6000.0),
        ] {
            db.insert_medication(&Medication::new(
                name.into(),
                manufacturer.into(),
                stock,
                price,
            ))
            .unwrap();
        }
        db
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();
        let id = db
            .insert_medication(&Medication::new("Omeprazole".into(), "Farpasa".into(), 90, 7100.0))
            .unwrap();

        let med = db.get_medication(id).unwrap().unwrap();
        assert_eq!(med.name, "Omeprazole");
        assert_eq!(med.stock, 90);
        assert_eq!(med.unit_price, 7100.0);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let db = setup_db();
        let err = db
            .insert_medication(&Medication::new("Ibuprofen".into(), "Other".into(), 1, 1.0))
            .unwrap_err();
        assert_eq!(err.unique_violation_target(), Some("medications.name"));
    }

    #[test]
    fn test_order_by_price_and_stock() {
        let db = setup_db();

        let by_price = db
            .list_medications(&ListQuery::new().order_by("-unit_price"))
            .unwrap();
        assert_eq!(by_price[0].name, "Salbutamol");

        let by_stock = db.list_medications(&ListQuery::new().order_by("stock")).unwrap();
        assert_eq!(by_stock[0].name, "Salbutamol");
        assert_eq!(by_stock[2].name, "Paracetamol");

        let gsk = db.list_medications(&ListQuery::new().search("gsk")).unwrap();
        assert_eq!(gsk.len(), 1);
    }

    #[test]
    fn test_update_stock() {
        let db = setup_db();
        let mut med = db
            .list_medications(&ListQuery::new().search("Paracetamol"))
            .unwrap()
            .remove(0);
        med.stock = 0;
        assert!(db.update_medication(&med).unwrap());
        assert_eq!(db.get_medication(med.id).unwrap().unwrap().stock, 0);
        assert_eq!(db.delete_all_medications().unwrap(), 3);
    }
}
