//! Patient database operations.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::query::{FilterField, FilterKind};
use super::{Database, DbError, DbResult, ListQuery, EntityQuery};
use crate::models::{BloodType, Patient};

const COLUMNS: &str = "p.id, p.national_id, p.name, p.surname, p.birth_date, p.blood_type, \
                       p.email, p.phone, p.address, p.active";

pub(crate) const PATIENT_QUERY: EntityQuery = EntityQuery {
    columns: COLUMNS,
    from: "patients p",
    pk: "p.id",
    search: &["p.name", "p.surname", "p.national_id", "p.email", "p.phone"],
    filters: &[
        FilterField::new("active", "p.active", FilterKind::Boolean),
        FilterField::new("blood_type", "p.blood_type", FilterKind::Text),
    ],
    ordering: &[
        ("surname", "p.surname"),
        ("name", "p.name"),
        ("birth_date", "p.birth_date"),
        ("id", "p.id"),
    ],
    default_order: "p.surname ASC, p.name ASC, p.id ASC",
};

impl Database {
    /// Insert a new patient, returning its id.
    ///
    /// The national identifier must carry a valid check character and the
    /// birth date may not be in the future.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<i64> {
        self.insert_patient_as_of(patient, Utc::now().date_naive())
    }

    /// Insert a patient, judging the birth date against `today`.
    pub fn insert_patient_as_of(&self, patient: &Patient, today: NaiveDate) -> DbResult<i64> {
        patient.validate(today)?;
        self.conn.execute(
            r#"
            INSERT INTO patients (
                national_id, name, surname, birth_date, blood_type,
                email, phone, address, active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                patient.national_id,
                patient.name,
                patient.surname,
                patient.birth_date,
                patient.blood_type.code(),
                patient.email,
                patient.phone,
                patient.address,
                patient.active,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update an existing patient.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        patient.validate(Utc::now().date_naive())?;
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                national_id = ?2,
                name = ?3,
                surname = ?4,
                birth_date = ?5,
                blood_type = ?6,
                email = ?7,
                phone = ?8,
                address = ?9,
                active = ?10
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.national_id,
                patient.name,
                patient.surname,
                patient.birth_date,
                patient.blood_type.code(),
                patient.email,
                patient.phone,
                patient.address,
                patient.active,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by id.
    pub fn get_patient(&self, id: i64) -> DbResult<Option<Patient>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM patients p WHERE p.id = ?", COLUMNS),
                [id],
                PatientRow::from_row,
            )
            .optional()?;

        row.map(Patient::try_from).transpose()
    }

    /// Get a patient by national identifier.
    pub fn get_patient_by_national_id(&self, national_id: &str) -> DbResult<Option<Patient>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM patients p WHERE p.national_id = ?", COLUMNS),
                [national_id],
                PatientRow::from_row,
            )
            .optional()?;

        row.map(Patient::try_from).transpose()
    }

    /// List patients matching a query.
    pub fn list_patients(&self, query: &ListQuery) -> DbResult<Vec<Patient>> {
        self.run_list(&PATIENT_QUERY, query, PatientRow::from_row)?
            .into_iter()
            .map(Patient::try_from)
            .collect()
    }

    /// Ids of all patients, ascending.
    pub fn patient_ids(&self) -> DbResult<Vec<i64>> {
        self.ids_of("patients")
    }

    /// Delete a patient (cascades to visits and lab reports).
    pub fn delete_patient(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    pub fn count_patients(&self) -> DbResult<usize> {
        self.count_table("patients")
    }

    pub fn delete_all_patients(&self) -> DbResult<usize> {
        self.clear_table("patients")
    }
}

/// Intermediate row struct for database mapping.
pub(crate) struct PatientRow {
    id: i64,
    national_id: String,
    name: String,
    surname: String,
    birth_date: NaiveDate,
    blood_type: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    active: bool,
}

impl PatientRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            national_id: row.get(1)?,
            name: row.get(2)?,
            surname: row.get(3)?,
            birth_date: row.get(4)?,
            blood_type: row.get(5)?,
            email: row.get(6)?,
            phone: row.get(7)?,
            address: row.get(8)?,
            active: row.get(9)?,
        })
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let blood_type: BloodType = row
            .blood_type
            .parse()
            .map_err(|_| DbError::Constraint(format!("Unknown blood type: {}", row.blood_type)))?;

        Ok(Patient {
            id: row.id,
            national_id: row.national_id,
            name: row.name,
            surname: row.surname,
            birth_date: row.birth_date,
            blood_type,
            email: row.email,
            phone: row.phone,
            address: row.address,
            active: row.active,
        })
    }
}
