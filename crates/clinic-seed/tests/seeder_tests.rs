//! Seeder integration tests against an in-memory database.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use clinic_core::models::{
    Doctor, Medication, Patient, Prescription, Specialty, Treatment, Visit, VisitStatus,
};
use clinic_core::{Database, DbError, DbResult, ListQuery};
use clinic_seed::{EntityKind, FixtureStore, SeedConfig, SeedError, SeedSummary, Seeder};
use rusqlite::ffi;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn seed_database(config: SeedConfig, seed: u64) -> (Database, SeedSummary) {
    let db = Database::open_in_memory().unwrap();
    let mut seeder = Seeder::seeded(db, config, seed).with_now(fixed_now());
    let summary = seeder.seed().unwrap();
    (seeder.into_store(), summary)
}

fn all<T>(list: impl Fn(&ListQuery) -> DbResult<Vec<T>>) -> Vec<T> {
    list(&ListQuery::new().order_by("id")).unwrap()
}

fn visits(db: &Database) -> Vec<Visit> {
    all(|q| db.list_visits(q))
}

fn treatments(db: &Database) -> Vec<Treatment> {
    all(|q| db.list_treatments(q))
}

fn prescriptions(db: &Database) -> Vec<Prescription> {
    all(|q| db.list_prescriptions(q))
}

fn sqlite_error(code: i32, message: &str) -> DbError {
    DbError::Sqlite(rusqlite::Error::SqliteFailure(
        ffi::Error::new(code),
        Some(message.to_string()),
    ))
}

/// Assert every structural rule of a seeded dataset.
fn assert_consistent(db: &Database, now: DateTime<Utc>) {
    let visits = visits(db);
    for visit in &visits {
        assert!(visit.visit_datetime >= now - Duration::days(730));
        assert!(visit.visit_datetime <= now + Duration::days(60));
        if visit.visit_datetime > now {
            assert_eq!(visit.status, VisitStatus::Pending, "future visit {}", visit.id);
        } else {
            assert_ne!(visit.status, VisitStatus::Pending, "past visit {}", visit.id);
        }
        assert_eq!(
            visit.diagnosis.is_some(),
            visit.status == VisitStatus::Completed,
            "visit {}",
            visit.id
        );
    }

    let by_id: HashMap<i64, &Visit> = visits.iter().map(|v| (v.id, v)).collect();
    let treatments = treatments(db);
    for treatment in &treatments {
        let visit = by_id[&treatment.visit_id];
        assert!(visit.is_treatable(), "treatment {} on visit {}", treatment.id, visit.id);
        assert!((7..=90).contains(&treatment.duration_days));
    }

    let medications: HashMap<i64, Medication> = all(|q| db.list_medications(q))
        .into_iter()
        .map(|m| (m.id, m))
        .collect();
    let max_per_treatment = medications.len().min(3);

    let mut per_treatment: HashMap<i64, Vec<i64>> = HashMap::new();
    for prescription in prescriptions(db) {
        per_treatment
            .entry(prescription.treatment_id)
            .or_default()
            .push(prescription.medication_id);

        let medication = &medications[&prescription.medication_id];
        let (amount, unit) = prescription.dosage.split_once(' ').unwrap();
        assert!(amount == "1" || amount == "2", "{}", prescription.dosage);
        if medication.name == "Salbutamol" {
            assert_eq!(unit, "puffs");
        } else {
            assert!(["tablets", "drops", "ml"].contains(&unit), "{}", unit);
        }

        let hours = prescription
            .frequency
            .strip_prefix("every ")
            .and_then(|s| s.strip_suffix(" hours"))
            .unwrap();
        assert!(["6", "8", "12", "24"].contains(&hours));

        let days: u32 = prescription
            .duration
            .strip_suffix(" days")
            .unwrap()
            .parse()
            .unwrap();
        assert!((5..=30).contains(&days));
    }

    for treatment in &treatments {
        let meds = per_treatment.get(&treatment.id).cloned().unwrap_or_default();
        assert!(
            (1..=max_per_treatment).contains(&meds.len()),
            "treatment {} has {} prescriptions",
            treatment.id,
            meds.len()
        );
        let distinct: HashSet<_> = meds.iter().collect();
        assert_eq!(distinct.len(), meds.len());
    }
}

#[test]
fn test_default_run_creates_full_dataset() {
    let (db, summary) = seed_database(SeedConfig::default(), 7);

    assert_eq!(summary.created(EntityKind::Specialty), 12);
    assert_eq!(summary.created(EntityKind::Doctor), 20);
    assert_eq!(summary.created(EntityKind::Patient), 50);
    assert_eq!(summary.created(EntityKind::Medication), 10);
    assert_eq!(summary.created(EntityKind::Visit), 100);
    assert_eq!(summary.total_failed(), 0);

    assert_eq!(db.count_specialties().unwrap(), 12);
    assert_eq!(db.count_doctors().unwrap(), 20);
    assert_eq!(db.count_patients().unwrap(), 50);
    assert_eq!(db.count_medications().unwrap(), 10);
    assert_eq!(db.count_visits().unwrap(), 100);
    assert_eq!(db.count_lab_reports().unwrap(), 0);

    let treatable = visits(&db).iter().filter(|v| v.is_treatable()).count();
    assert!(db.count_treatments().unwrap() <= treatable);
    assert_eq!(summary.created(EntityKind::Treatment), db.count_treatments().unwrap());
    assert_eq!(
        summary.created(EntityKind::Prescription),
        db.count_prescriptions().unwrap()
    );

    // Every stored identifier carries a valid check character
    for doctor in all(|q| db.list_doctors(q)) {
        assert!(clinic_core::rut::is_valid(&doctor.national_id), "{}", doctor.national_id);
        assert!(doctor.email.contains('@'));
    }
    for patient in all(|q| db.list_patients(q)) {
        assert!(clinic_core::rut::is_valid(&patient.national_id));
        let age = patient.age_on(fixed_now().date_naive());
        assert!((1..=90).contains(&age), "age {}", age);
    }

    assert_consistent(&db, fixed_now());
}

#[test]
fn test_every_treatable_visit_treated_when_certain() {
    let config = SeedConfig {
        treatment_probability: 1.0,
        treatment_note_probability: 0.0,
        ..SeedConfig::default()
    };
    let (db, _) = seed_database(config, 19);

    let treatable: HashSet<i64> = visits(&db)
        .iter()
        .filter(|v| v.is_treatable())
        .map(|v| v.id)
        .collect();
    let treated: HashSet<i64> = treatments(&db).iter().map(|t| t.visit_id).collect();
    assert_eq!(treated, treatable);
    assert!(treatments(&db).iter().all(|t| t.notes.is_none()));

    assert_consistent(&db, fixed_now());
}

#[test]
fn test_second_run_replaces_first() {
    let db = Database::open_in_memory().unwrap();
    let mut seeder = Seeder::seeded(db, SeedConfig::default(), 3).with_now(fixed_now());

    let first = seeder.seed().unwrap();
    assert!(first.deleted.iter().all(|d| d.count == 0));

    let second = seeder.seed().unwrap();
    for kind in [
        EntityKind::Specialty,
        EntityKind::Doctor,
        EntityKind::Patient,
        EntityKind::Medication,
        EntityKind::Visit,
        EntityKind::Treatment,
        EntityKind::Prescription,
    ] {
        assert_eq!(second.deleted(kind), first.created(kind), "{}", kind);
    }

    let db = seeder.into_store();
    assert_eq!(db.count_specialties().unwrap(), 12);
    assert_eq!(db.count_medications().unwrap(), 10);
    assert_eq!(db.count_visits().unwrap(), 100);
    assert_consistent(&db, fixed_now());
}

#[test]
fn test_zero_patients_skips_visits() {
    let config = SeedConfig {
        patients: 0,
        ..SeedConfig::default()
    };
    let (db, summary) = seed_database(config, 5);

    assert_eq!(summary.created(EntityKind::Doctor), 20);
    assert!(summary.stage(EntityKind::Visit).unwrap().skipped);
    assert!(summary.stage(EntityKind::Treatment).unwrap().skipped);
    assert!(summary.stage(EntityKind::Prescription).unwrap().skipped);
    assert_eq!(db.count_visits().unwrap(), 0);
    assert_eq!(db.count_treatments().unwrap(), 0);
}

/// In-memory log sink for the formatting subscriber.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_zero_patients_warns() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    let config = SeedConfig {
        patients: 0,
        ..SeedConfig::default()
    };
    let (_, summary) = tracing::subscriber::with_default(subscriber, || seed_database(config, 5));
    assert!(summary.stage(EntityKind::Visit).unwrap().skipped);

    let output = logs.contents();
    let visit_warning = output
        .lines()
        .find(|line| line.contains("stage skipped") && line.contains("entity=visits"))
        .unwrap_or_else(|| panic!("no skip warning for visits in:\n{}", output));
    assert!(visit_warning.contains("WARN"));
    assert!(!output.contains("ERROR"));
}

#[test]
fn test_future_clock_accepts_young_patients() {
    // Birth dates follow the pinned clock, not the wall clock
    let config = SeedConfig {
        min_patient_age: 1,
        max_patient_age: 3,
        ..SeedConfig::default()
    };
    let mut seeder = Seeder::seeded(Database::open_in_memory().unwrap(), config, 11)
        .with_now(Utc::now() + Duration::days(730));
    let summary = seeder.seed().unwrap();

    let patients = summary.stage(EntityKind::Patient).unwrap();
    assert_eq!(patients.created, 50);
    assert_eq!(patients.failed, 0);
}

#[test]
fn test_same_seed_same_dataset() {
    let (a, _) = seed_database(SeedConfig::default(), 42);
    let (b, _) = seed_database(SeedConfig::default(), 42);

    assert_eq!(all(|q| a.list_doctors(q)), all(|q| b.list_doctors(q)));
    assert_eq!(all(|q| a.list_patients(q)), all(|q| b.list_patients(q)));
    assert_eq!(visits(&a), visits(&b));
    assert_eq!(treatments(&a), treatments(&b));
    assert_eq!(prescriptions(&a), prescriptions(&b));

    let (c, _) = seed_database(SeedConfig::default(), 43);
    assert_ne!(all(|q| a.list_doctors(q)), all(|q| c.list_doctors(q)));
}

/// Faults a [`FaultyStore`] can inject.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Fault {
    DoctorNationalId,
    DoctorEmail,
    SpecialtyCheck,
    VisitIo,
}

/// Database wrapper failing the first `remaining` matching calls.
struct FaultyStore {
    db: Database,
    fault: Fault,
    remaining: usize,
    doctor_calls: usize,
}

impl FaultyStore {
    fn new(fault: Fault, remaining: usize) -> Self {
        Self {
            db: Database::open_in_memory().unwrap(),
            fault,
            remaining,
            doctor_calls: 0,
        }
    }

    fn inject(&mut self, fault: Fault) -> Option<DbError> {
        if self.fault != fault || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(match fault {
            Fault::DoctorNationalId => sqlite_error(
                ffi::SQLITE_CONSTRAINT_UNIQUE,
                "UNIQUE constraint failed: doctors.national_id",
            ),
            Fault::DoctorEmail => sqlite_error(
                ffi::SQLITE_CONSTRAINT_UNIQUE,
                "UNIQUE constraint failed: doctors.email",
            ),
            Fault::SpecialtyCheck => sqlite_error(
                ffi::SQLITE_CONSTRAINT_CHECK,
                "CHECK constraint failed: specialties",
            ),
            Fault::VisitIo => sqlite_error(ffi::SQLITE_IOERR, "disk I/O error"),
        })
    }
}

impl FixtureStore for FaultyStore {
    fn delete_all(&mut self, kind: EntityKind) -> DbResult<usize> {
        self.db.delete_all(kind)
    }

    fn ids(&self, kind: EntityKind) -> DbResult<Vec<i64>> {
        self.db.ids(kind)
    }

    fn create_specialty(&mut self, specialty: &Specialty) -> DbResult<i64> {
        match self.inject(Fault::SpecialtyCheck) {
            Some(err) => Err(err),
            None => self.db.create_specialty(specialty),
        }
    }

    fn create_doctor(&mut self, doctor: &Doctor) -> DbResult<i64> {
        self.doctor_calls += 1;
        if let Some(err) = self.inject(Fault::DoctorNationalId) {
            return Err(err);
        }
        match self.inject(Fault::DoctorEmail) {
            Some(err) => Err(err),
            None => self.db.create_doctor(doctor),
        }
    }

    fn create_patient(&mut self, patient: &Patient, today: NaiveDate) -> DbResult<i64> {
        self.db.create_patient(patient, today)
    }

    fn create_medication(&mut self, medication: &Medication) -> DbResult<i64> {
        self.db.create_medication(medication)
    }

    fn create_visit(&mut self, visit: &Visit) -> DbResult<i64> {
        match self.inject(Fault::VisitIo) {
            Some(err) => Err(err),
            None => self.db.create_visit(visit),
        }
    }

    fn create_treatment(&mut self, treatment: &Treatment) -> DbResult<i64> {
        self.db.create_treatment(treatment)
    }

    fn create_prescription(&mut self, prescription: &Prescription) -> DbResult<i64> {
        self.db.create_prescription(prescription)
    }
}

fn small_config() -> SeedConfig {
    SeedConfig {
        doctors: 3,
        patients: 4,
        visits: 10,
        ..SeedConfig::default()
    }
}

#[test]
fn test_national_id_collision_is_retried() {
    let store = FaultyStore::new(Fault::DoctorNationalId, 2);
    let mut seeder = Seeder::seeded(store, small_config(), 8).with_now(fixed_now());
    let summary = seeder.seed().unwrap();

    assert_eq!(summary.created(EntityKind::Doctor), 3);
    assert_eq!(summary.stage(EntityKind::Doctor).unwrap().failed, 0);

    let store = seeder.into_store();
    // Two rejected attempts on the first doctor, then one call each
    assert_eq!(store.doctor_calls, 5);
    assert_eq!(store.db.count_doctors().unwrap(), 3);
}

#[test]
fn test_persistent_collision_aborts() {
    let store = FaultyStore::new(Fault::DoctorNationalId, usize::MAX);
    let mut seeder = Seeder::seeded(store, small_config(), 8).with_now(fixed_now());

    match seeder.seed() {
        Err(SeedError::IdentifierExhausted { entity, attempts }) => {
            assert_eq!(entity, EntityKind::Doctor);
            assert_eq!(attempts, 5);
        }
        other => panic!("expected IdentifierExhausted, got {:?}", other),
    }
    assert_eq!(seeder.store().doctor_calls, 5);
}

#[test]
fn test_email_collision_fails_only_that_record() {
    let store = FaultyStore::new(Fault::DoctorEmail, 1);
    let mut seeder = Seeder::seeded(store, small_config(), 8).with_now(fixed_now());
    let summary = seeder.seed().unwrap();

    let doctors = summary.stage(EntityKind::Doctor).unwrap();
    assert_eq!(doctors.created, 2);
    assert_eq!(doctors.failed, 1);
    // No identifier regeneration for other unique columns
    assert_eq!(seeder.store().doctor_calls, 3);
}

#[test]
fn test_missing_specialties_skip_dependent_stages() {
    let store = FaultyStore::new(Fault::SpecialtyCheck, usize::MAX);
    let mut seeder = Seeder::seeded(store, small_config(), 8).with_now(fixed_now());
    let summary = seeder.seed().unwrap();

    assert_eq!(summary.stage(EntityKind::Specialty).unwrap().failed, 12);
    assert!(summary.stage(EntityKind::Doctor).unwrap().skipped);
    // Patients and medications do not depend on specialties
    assert_eq!(summary.created(EntityKind::Patient), 4);
    assert_eq!(summary.created(EntityKind::Medication), 10);
    assert!(summary.stage(EntityKind::Visit).unwrap().skipped);
}

#[test]
fn test_store_failure_aborts_run() {
    let store = FaultyStore::new(Fault::VisitIo, 1);
    let mut seeder = Seeder::seeded(store, small_config(), 8).with_now(fixed_now());

    let err = seeder.seed().unwrap_err();
    assert!(matches!(err, SeedError::Store(_)), "{:?}", err);
}

#[test]
fn test_on_disk_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clinic.db");

    {
        let db = Database::open(&path).unwrap();
        let mut seeder = Seeder::seeded(db, small_config(), 11).with_now(fixed_now());
        seeder.seed().unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.count_doctors().unwrap(), 3);
    assert_eq!(db.count_visits().unwrap(), 10);
    assert_consistent(&db, fixed_now());
}
