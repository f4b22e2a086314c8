//! Dependency-ordered fixture seeding.
//!
//! A run clears the store, then creates specialties, doctors, patients,
//! medications, visits, treatments and prescriptions in that order. Each
//! stage only references records that exist by the time it runs; a stage
//! whose prerequisites are missing is skipped with a warning.
//!
//! Rejected records (constraint or validation failures) are logged and
//! counted; any other store error aborts the run.

use std::cmp;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use clinic_core::models::{
    BloodType, Doctor, Medication, Patient, Prescription, Specialty, Treatment, Visit, VisitStatus,
};
use clinic_core::{rut, DbResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use crate::catalog::{
    is_inhaler, DOSAGE_UNITS, FREQUENCY_HOURS, INHALER_UNIT, MEDICATIONS, SPECIALTY_NAMES,
};
use crate::config::SeedConfig;
use crate::error::{SeedError, SeedResult};
use crate::provider::{FakeProvider, TextProvider};
use crate::store::{EntityKind, FixtureStore};
use crate::summary::{RecordOutcome, SeedSummary, StageSummary};

/// Keeps the choice stream apart from the provider's text stream.
const RNG_STREAM_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

/// A medication created during this run.
#[derive(Debug, Clone, Copy)]
struct SeededMedication {
    id: i64,
    name: &'static str,
}

/// Populates a [`FixtureStore`] with a coherent synthetic dataset.
pub struct Seeder<S, P, R> {
    store: S,
    provider: P,
    rng: R,
    config: SeedConfig,
    now: DateTime<Utc>,
}

impl<S: FixtureStore> Seeder<S, FakeProvider, StdRng> {
    /// Seeder whose whole output is determined by `seed` and the clock.
    pub fn seeded(store: S, config: SeedConfig, seed: u64) -> Self {
        Self::new(
            store,
            FakeProvider::seeded(seed),
            StdRng::seed_from_u64(seed.wrapping_add(RNG_STREAM_OFFSET)),
            config,
        )
    }
}

impl<S, P, R> Seeder<S, P, R>
where
    S: FixtureStore,
    P: TextProvider,
    R: Rng,
{
    pub fn new(store: S, provider: P, rng: R, config: SeedConfig) -> Self {
        Self {
            store,
            provider,
            rng,
            config,
            now: Utc::now().trunc_subsecs(0),
        }
    }

    /// Pin the reference instant visits are placed around.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now.trunc_subsecs(0);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Clear the store and create a fresh dataset.
    pub fn seed(&mut self) -> SeedResult<SeedSummary> {
        self.config.validate()?;
        info!(now = %self.now, "seeding started");

        let mut summary = SeedSummary::default();
        self.reset(&mut summary)?;

        let stage = self.seed_specialties()?;
        summary.push_stage(EntityKind::Specialty, stage);

        let stage = self.seed_doctors()?;
        summary.push_stage(EntityKind::Doctor, stage);

        let stage = self.seed_patients()?;
        summary.push_stage(EntityKind::Patient, stage);

        let (stage, medications) = self.seed_medications()?;
        summary.push_stage(EntityKind::Medication, stage);

        let (stage, visits) = self.seed_visits()?;
        summary.push_stage(EntityKind::Visit, stage);

        let (stage, treatments) = self.seed_treatments(&visits)?;
        summary.push_stage(EntityKind::Treatment, stage);

        let stage = self.seed_prescriptions(&treatments, &medications)?;
        summary.push_stage(EntityKind::Prescription, stage);

        info!(
            created = summary.total_created(),
            failed = summary.total_failed(),
            "seeding finished"
        );
        Ok(summary)
    }

    fn reset(&mut self, summary: &mut SeedSummary) -> SeedResult<()> {
        for kind in EntityKind::RESET_ORDER {
            let removed = self.store.delete_all(kind)?;
            debug!(entity = %kind, removed, "cleared");
            summary.push_deleted(kind, removed);
        }
        info!(
            removed = summary.deleted.iter().map(|d| d.count).sum::<usize>(),
            "existing records cleared"
        );
        Ok(())
    }

    fn seed_specialties(&mut self) -> SeedResult<StageSummary> {
        let mut stage = StageSummary::default();
        for name in SPECIALTY_NAMES {
            let specialty = Specialty::new(name.to_string(), Some(self.provider.random_sentence(10)));
            let outcome = record(EntityKind::Specialty, self.store.create_specialty(&specialty))?;
            stage.record(outcome);
        }
        Ok(finish(EntityKind::Specialty, stage))
    }

    fn seed_doctors(&mut self) -> SeedResult<StageSummary> {
        let specialties = self.store.ids(EntityKind::Specialty)?;
        if specialties.is_empty() {
            return Ok(skip(EntityKind::Doctor, "no specialties"));
        }

        let mut stage = StageSummary::default();
        for _ in 0..self.config.doctors {
            let specialty_id = specialties[self.rng.gen_range(0..specialties.len())];
            let mut doctor = Doctor::new(
                self.provider.random_first_name(),
                self.provider.random_last_name(),
                String::new(),
                self.provider.random_email(),
                specialty_id,
            );
            doctor.phone = Some(self.provider.random_phone());
            doctor.active = self
                .provider
                .random_boolean(self.config.doctor_active_probability);

            let outcome = self.create_with_identifier(EntityKind::Doctor, |store, national_id| {
                doctor.national_id = national_id;
                store.create_doctor(&doctor)
            })?;
            stage.record(outcome);
        }
        Ok(finish(EntityKind::Doctor, stage))
    }

    fn seed_patients(&mut self) -> SeedResult<StageSummary> {
        let today = self.now.date_naive();
        let mut stage = StageSummary::default();
        for _ in 0..self.config.patients {
            let birth_date = self.provider.random_date_of_birth(
                today,
                self.config.min_patient_age,
                self.config.max_patient_age,
            );
            let blood_type = BloodType::ALL[self.rng.gen_range(0..BloodType::ALL.len())];
            let mut patient = Patient::new(
                String::new(),
                self.provider.random_first_name(),
                self.provider.random_last_name(),
                birth_date,
                blood_type,
            );
            patient.email = Some(self.provider.random_email());
            patient.phone = Some(self.provider.random_phone());
            patient.address = Some(self.provider.random_address());
            patient.active = self
                .provider
                .random_boolean(self.config.patient_active_probability);

            let outcome = self.create_with_identifier(EntityKind::Patient, |store, national_id| {
                patient.national_id = national_id;
                store.create_patient(&patient, today)
            })?;
            stage.record(outcome);
        }
        Ok(finish(EntityKind::Patient, stage))
    }

    fn seed_medications(&mut self) -> SeedResult<(StageSummary, Vec<SeededMedication>)> {
        let mut stage = StageSummary::default();
        let mut created = Vec::with_capacity(MEDICATIONS.len());
        for entry in MEDICATIONS {
            let medication = Medication::new(
                entry.name.to_string(),
                entry.manufacturer.to_string(),
                entry.stock,
                entry.unit_price,
            );
            let outcome = record(EntityKind::Medication, self.store.create_medication(&medication))?;
            if let RecordOutcome::Created(id) = outcome {
                created.push(SeededMedication {
                    id,
                    name: entry.name,
                });
            }
            stage.record(outcome);
        }
        Ok((finish(EntityKind::Medication, stage), created))
    }

    fn seed_visits(&mut self) -> SeedResult<(StageSummary, Vec<Visit>)> {
        let patients = self.store.ids(EntityKind::Patient)?;
        let doctors = self.store.ids(EntityKind::Doctor)?;
        if patients.is_empty() || doctors.is_empty() {
            return Ok((
                skip(EntityKind::Visit, "visits need at least one patient and one doctor"),
                Vec::new(),
            ));
        }

        let start = self.now - Duration::days(self.config.visit_days_back);
        let end = self.now + Duration::days(self.config.visit_days_ahead);

        let mut stage = StageSummary::default();
        let mut created = Vec::with_capacity(self.config.visits);
        for _ in 0..self.config.visits {
            let patient_id = patients[self.rng.gen_range(0..patients.len())];
            let doctor_id = doctors[self.rng.gen_range(0..doctors.len())];
            let visit_datetime = self.provider.random_datetime_between(start, end);
            let mut visit = Visit::new(
                patient_id,
                doctor_id,
                visit_datetime,
                self.provider.random_sentence(15),
            );

            // Future visits cannot have happened yet
            visit.status = if visit_datetime > self.now {
                VisitStatus::Pending
            } else if self.rng.gen_bool(0.5) {
                VisitStatus::Completed
            } else {
                VisitStatus::Cancelled
            };
            if visit.status == VisitStatus::Completed {
                visit.diagnosis = Some(self.provider.random_paragraph(2));
            }

            let outcome = record(EntityKind::Visit, self.store.create_visit(&visit))?;
            if let RecordOutcome::Created(id) = outcome {
                visit.id = id;
                created.push(visit);
            }
            stage.record(outcome);
        }
        Ok((finish(EntityKind::Visit, stage), created))
    }

    fn seed_treatments(&mut self, visits: &[Visit]) -> SeedResult<(StageSummary, Vec<i64>)> {
        let treatable: Vec<&Visit> = visits.iter().filter(|v| v.is_treatable()).collect();
        if treatable.is_empty() {
            return Ok((
                skip(EntityKind::Treatment, "no completed visits with a diagnosis"),
                Vec::new(),
            ));
        }

        let mut stage = StageSummary::default();
        let mut created = Vec::new();
        for visit in treatable {
            if !self.provider.random_boolean(self.config.treatment_probability) {
                continue;
            }
            let duration_days = self
                .rng
                .gen_range(self.config.min_treatment_days..=self.config.max_treatment_days);
            let mut treatment =
                Treatment::new(visit.id, self.provider.random_paragraph(3), duration_days);
            if self
                .provider
                .random_boolean(self.config.treatment_note_probability)
            {
                treatment.notes = Some(self.provider.random_sentence(10));
            }

            let outcome = record(EntityKind::Treatment, self.store.create_treatment(&treatment))?;
            created.extend(outcome.id());
            stage.record(outcome);
        }
        Ok((finish(EntityKind::Treatment, stage), created))
    }

    fn seed_prescriptions(
        &mut self,
        treatments: &[i64],
        medications: &[SeededMedication],
    ) -> SeedResult<StageSummary> {
        if treatments.is_empty() || medications.is_empty() {
            return Ok(skip(
                EntityKind::Prescription,
                "prescriptions need treatments and medications",
            ));
        }

        let max_per_treatment = cmp::min(
            self.config.max_prescriptions_per_treatment,
            medications.len(),
        );
        let mut stage = StageSummary::default();
        for &treatment_id in treatments {
            let count = self.rng.gen_range(1..=max_per_treatment);
            let chosen: Vec<SeededMedication> = medications
                .choose_multiple(&mut self.rng, count)
                .copied()
                .collect();

            for medication in chosen {
                let unit = if is_inhaler(medication.name) {
                    INHALER_UNIT
                } else {
                    DOSAGE_UNITS[self.rng.gen_range(0..DOSAGE_UNITS.len())]
                };
                let hours = FREQUENCY_HOURS[self.rng.gen_range(0..FREQUENCY_HOURS.len())];
                let prescription = Prescription::new(
                    treatment_id,
                    medication.id,
                    format!("{} {}", self.rng.gen_range(1..=2), unit),
                    format!("every {} hours", hours),
                    format!("{} days", self.rng.gen_range(5..=30)),
                );

                let outcome = record(
                    EntityKind::Prescription,
                    self.store.create_prescription(&prescription),
                )?;
                stage.record(outcome);
            }
        }
        Ok(finish(EntityKind::Prescription, stage))
    }

    /// Insert a person, regenerating the national id while it collides.
    fn create_with_identifier<F>(&mut self, kind: EntityKind, mut create: F) -> SeedResult<RecordOutcome>
    where
        F: FnMut(&mut S, String) -> DbResult<i64>,
    {
        let attempts = self.config.max_identifier_attempts;
        for attempt in 1..=attempts {
            let national_id = rut::generate(&mut self.rng);
            match create(&mut self.store, national_id) {
                Err(e)
                    if kind.national_id_column().is_some()
                        && e.unique_violation_target() == kind.national_id_column() =>
                {
                    warn!(entity = %kind, attempt, "national id already taken, regenerating");
                }
                result => return record(kind, result),
            }
        }
        Err(SeedError::IdentifierExhausted {
            entity: kind,
            attempts,
        })
    }
}

/// Classify one insert: rejected records are logged, anything else aborts.
fn record(kind: EntityKind, result: DbResult<i64>) -> SeedResult<RecordOutcome> {
    match result {
        Ok(id) => Ok(RecordOutcome::Created(id)),
        Err(e) if e.is_record_error() => {
            error!(entity = %kind, error = %e, "record rejected");
            Ok(RecordOutcome::Failed)
        }
        Err(e) => Err(e.into()),
    }
}

fn finish(kind: EntityKind, stage: StageSummary) -> StageSummary {
    info!(
        entity = %kind,
        created = stage.created,
        failed = stage.failed,
        "stage complete"
    );
    stage
}

fn skip(kind: EntityKind, reason: &str) -> StageSummary {
    warn!(entity = %kind, reason, "stage skipped");
    StageSummary::skipped()
}
