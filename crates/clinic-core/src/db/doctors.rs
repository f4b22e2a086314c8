//! Doctor database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::query::{FilterField, FilterKind};
use super::{Database, DbResult, ListQuery, EntityQuery};
use crate::models::Doctor;

const COLUMNS: &str =
    "d.id, d.name, d.surname, d.national_id, d.email, d.phone, d.active, d.specialty_id";

pub(crate) const DOCTOR_QUERY: EntityQuery = EntityQuery {
    columns: COLUMNS,
    from: "doctors d JOIN specialties s ON s.id = d.specialty_id",
    pk: "d.id",
    search: &["d.name", "d.surname", "d.national_id", "d.email"],
    filters: &[
        FilterField::new("specialty", "d.specialty_id", FilterKind::Integer),
        FilterField::new("active", "d.active", FilterKind::Boolean),
    ],
    ordering: &[
        ("surname", "d.surname"),
        ("name", "d.name"),
        ("specialty_name", "s.name"),
        ("id", "d.id"),
    ],
    default_order: "d.surname ASC, d.name ASC, d.id ASC",
};

pub(crate) fn doctor_from_row(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: row.get(0)?,
        name: row.get(1)?,
        surname: row.get(2)?,
        national_id: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        active: row.get(6)?,
        specialty_id: row.get(7)?,
    })
}

impl Database {
    /// Insert a new doctor, returning its id.
    ///
    /// The national identifier must carry a valid check character.
    pub fn insert_doctor(&self, doctor: &Doctor) -> DbResult<i64> {
        doctor.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO doctors (
                name, surname, national_id, email, phone, active, specialty_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                doctor.name,
                doctor.surname,
                doctor.national_id,
                doctor.email,
                doctor.phone,
                doctor.active,
                doctor.specialty_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update an existing doctor.
    pub fn update_doctor(&self, doctor: &Doctor) -> DbResult<bool> {
        doctor.validate()?;
        let rows_affected = self.conn.execute(
            r#"
            UPDATE doctors SET
                name = ?2,
                surname = ?3,
                national_id = ?4,
                email = ?5,
                phone = ?6,
                active = ?7,
                specialty_id = ?8
            WHERE id = ?1
            "#,
            params![
                doctor.id,
                doctor.name,
                doctor.surname,
                doctor.national_id,
                doctor.email,
                doctor.phone,
                doctor.active,
                doctor.specialty_id,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a doctor by id.
    pub fn get_doctor(&self, id: i64) -> DbResult<Option<Doctor>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM doctors d WHERE d.id = ?", COLUMNS),
                [id],
                doctor_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a doctor by national identifier.
    pub fn get_doctor_by_national_id(&self, national_id: &str) -> DbResult<Option<Doctor>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM doctors d WHERE d.national_id = ?", COLUMNS),
                [national_id],
                doctor_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List doctors matching a query.
    pub fn list_doctors(&self, query: &ListQuery) -> DbResult<Vec<Doctor>> {
        self.run_list(&DOCTOR_QUERY, query, doctor_from_row)
    }

    /// Ids of all doctors, ascending.
    pub fn doctor_ids(&self) -> DbResult<Vec<i64>> {
        self.ids_of("doctors")
    }

    /// Delete a doctor (cascades to their visits).
    pub fn delete_doctor(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM doctors WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    pub fn count_doctors(&self) -> DbResult<usize> {
        self.count_table("doctors")
    }

    pub fn delete_all_doctors(&self) -> DbResult<usize> {
        self.clear_table("doctors")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Specialty;

    fn setup_db() -> (Database, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        let cardio = db
            .insert_specialty(&Specialty::new("Cardiology".into(), None))
            .unwrap();
        let neuro = db
            .insert_specialty(&Specialty::new("Neurology".into(), None))
            .unwrap();
        (db, cardio, neuro)
    }

    fn doctor(name: &str, surname: &str, rut: &str, specialty_id: i64) -> Doctor {
        Doctor::new(
            name.into(),
            surname.into(),
            rut.into(),
            format!("{}.{}@clinic.test", name, surname).to_lowercase(),
            specialty_id,
        )
    }

    #[test]
    fn test_insert_and_get() {
        let (db, cardio, _) = setup_db();

        let mut d = doctor("Ana", "Rojas", "12345678-5", cardio);
        d.phone = Some("+56 9 1234 5678".into());
        let id = db.insert_doctor(&d).unwrap();

        let retrieved = db.get_doctor(id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Ana");
        assert_eq!(retrieved.specialty_id, cardio);
        assert_eq!(retrieved.phone, Some("+56 9 1234 5678".into()));
        assert!(retrieved.active);

        let by_rut = db.get_doctor_by_national_id("12345678-5").unwrap().unwrap();
        assert_eq!(by_rut.id, id);
    }

    #[test]
    fn test_invalid_national_id_rejected() {
        let (db, cardio, _) = setup_db();
        let err = db
            .insert_doctor(&doctor("Ana", "Rojas", "12345678-9", cardio))
            .unwrap_err();
        assert!(matches!(err, crate::db::DbError::Validation(_)));
        assert_eq!(db.count_doctors().unwrap(), 0);
    }

    #[test]
    fn test_duplicate_national_id_is_unique_violation() {
        let (db, cardio, _) = setup_db();
        db.insert_doctor(&doctor("Ana", "Rojas", "12345678-5", cardio))
            .unwrap();

        let err = db
            .insert_doctor(&doctor("Luis", "Soto", "12345678-5", cardio))
            .unwrap_err();
        assert_eq!(err.unique_violation_target(), Some("doctors.national_id"));

        let err = db
            .insert_doctor(&Doctor::new(
                "Eva".into(),
                "Diaz".into(),
                "1000005-K".into(),
                "ana.rojas@clinic.test".into(),
                cardio,
            ))
            .unwrap_err();
        assert_eq!(err.unique_violation_target(), Some("doctors.email"));
    }

    #[test]
    fn test_unknown_specialty_rejected() {
        let (db, _, _) = setup_db();
        let err = db
            .insert_doctor(&doctor("Ana", "Rojas", "12345678-5", 999))
            .unwrap_err();
        assert!(err.is_constraint_violation());
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_list_filters_and_specialty_ordering() {
        let (db, cardio, neuro) = setup_db();
        db.insert_doctor(&doctor("Ana", "Rojas", "12345678-5", neuro))
            .unwrap();
        let mut inactive = doctor("Luis", "Soto", "1000005-K", cardio);
        inactive.active = false;
        db.insert_doctor(&inactive).unwrap();
        db.insert_doctor(&doctor("Eva", "Diaz", "1000013-0", cardio))
            .unwrap();

        let all = db.list_doctors(&ListQuery::new()).unwrap();
        let surnames: Vec<_> = all.iter().map(|d| d.surname.as_str()).collect();
        assert_eq!(surnames, vec!["Diaz", "Rojas", "Soto"]);

        let cardiologists = db
            .list_doctors(&ListQuery::new().filter("specialty", cardio.to_string()))
            .unwrap();
        assert_eq!(cardiologists.len(), 2);

        let active_cardio = db
            .list_doctors(
                &ListQuery::new()
                    .filter("specialty", cardio.to_string())
                    .filter("active", "true"),
            )
            .unwrap();
        assert_eq!(active_cardio.len(), 1);
        assert_eq!(active_cardio[0].surname, "Diaz");

        let by_specialty = db
            .list_doctors(&ListQuery::new().order_by("-specialty_name").order_by("surname"))
            .unwrap();
        let surnames: Vec<_> = by_specialty.iter().map(|d| d.surname.as_str()).collect();
        assert_eq!(surnames, vec!["Rojas", "Diaz", "Soto"]);

        let found = db.list_doctors(&ListQuery::new().search("1000005")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Luis");
    }

    #[test]
    fn test_specialty_delete_cascades() {
        let (db, cardio, _) = setup_db();
        db.insert_doctor(&doctor("Ana", "Rojas", "12345678-5", cardio))
            .unwrap();
        db.delete_specialty(cardio).unwrap();
        assert_eq!(db.count_doctors().unwrap(), 0);
    }
}
