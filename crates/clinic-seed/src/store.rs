//! Persistence seam between the seeder and the database.

use std::fmt;

use chrono::NaiveDate;
use clinic_core::models::{Doctor, Medication, Patient, Prescription, Specialty, Treatment, Visit};
use clinic_core::{Database, DbResult};
use serde::{Deserialize, Serialize};

/// Entity types the seeder touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Specialty,
    Doctor,
    Patient,
    Medication,
    Visit,
    Treatment,
    Prescription,
    LabReport,
}

impl EntityKind {
    /// Dependents before their parents, so no delete trips a foreign key.
    pub const RESET_ORDER: [EntityKind; 8] = [
        EntityKind::LabReport,
        EntityKind::Prescription,
        EntityKind::Medication,
        EntityKind::Treatment,
        EntityKind::Visit,
        EntityKind::Patient,
        EntityKind::Doctor,
        EntityKind::Specialty,
    ];

    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Specialty => "specialties",
            EntityKind::Doctor => "doctors",
            EntityKind::Patient => "patients",
            EntityKind::Medication => "medications",
            EntityKind::Visit => "visits",
            EntityKind::Treatment => "treatments",
            EntityKind::Prescription => "prescriptions",
            EntityKind::LabReport => "lab_reports",
        }
    }

    /// The `table.column` SQLite names when a national id collides.
    pub fn national_id_column(&self) -> Option<&'static str> {
        match self {
            EntityKind::Doctor => Some("doctors.national_id"),
            EntityKind::Patient => Some("patients.national_id"),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Storage operations the seeder needs.
pub trait FixtureStore {
    /// Delete every record of a kind, returning how many went.
    fn delete_all(&mut self, kind: EntityKind) -> DbResult<usize>;

    /// Ids of every stored record of a kind, ascending.
    fn ids(&self, kind: EntityKind) -> DbResult<Vec<i64>>;

    fn create_specialty(&mut self, specialty: &Specialty) -> DbResult<i64>;
    fn create_doctor(&mut self, doctor: &Doctor) -> DbResult<i64>;
    /// Insert a patient whose birth date is judged against `today`.
    fn create_patient(&mut self, patient: &Patient, today: NaiveDate) -> DbResult<i64>;
    fn create_medication(&mut self, medication: &Medication) -> DbResult<i64>;
    fn create_visit(&mut self, visit: &Visit) -> DbResult<i64>;
    fn create_treatment(&mut self, treatment: &Treatment) -> DbResult<i64>;
    fn create_prescription(&mut self, prescription: &Prescription) -> DbResult<i64>;
}

impl FixtureStore for Database {
    fn delete_all(&mut self, kind: EntityKind) -> DbResult<usize> {
        match kind {
            EntityKind::Specialty => self.delete_all_specialties(),
            EntityKind::Doctor => self.delete_all_doctors(),
            EntityKind::Patient => self.delete_all_patients(),
            EntityKind::Medication => self.delete_all_medications(),
            EntityKind::Visit => self.delete_all_visits(),
            EntityKind::Treatment => self.delete_all_treatments(),
            EntityKind::Prescription => self.delete_all_prescriptions(),
            EntityKind::LabReport => self.delete_all_lab_reports(),
        }
    }

    fn ids(&self, kind: EntityKind) -> DbResult<Vec<i64>> {
        match kind {
            EntityKind::Specialty => self.specialty_ids(),
            EntityKind::Doctor => self.doctor_ids(),
            EntityKind::Patient => self.patient_ids(),
            EntityKind::Medication => self.medication_ids(),
            EntityKind::Visit => self.visit_ids(),
            EntityKind::Treatment => self.treatment_ids(),
            EntityKind::Prescription => self.prescription_ids(),
            EntityKind::LabReport => self.lab_report_ids(),
        }
    }

    fn create_specialty(&mut self, specialty: &Specialty) -> DbResult<i64> {
        self.insert_specialty(specialty)
    }

    fn create_doctor(&mut self, doctor: &Doctor) -> DbResult<i64> {
        self.insert_doctor(doctor)
    }

    fn create_patient(&mut self, patient: &Patient, today: NaiveDate) -> DbResult<i64> {
        self.insert_patient_as_of(patient, today)
    }

    fn create_medication(&mut self, medication: &Medication) -> DbResult<i64> {
        self.insert_medication(medication)
    }

    fn create_visit(&mut self, visit: &Visit) -> DbResult<i64> {
        self.insert_visit(visit)
    }

    fn create_treatment(&mut self, treatment: &Treatment) -> DbResult<i64> {
        self.insert_treatment(treatment)
    }

    fn create_prescription(&mut self, prescription: &Prescription) -> DbResult<i64> {
        self.insert_prescription(prescription)
    }
}
