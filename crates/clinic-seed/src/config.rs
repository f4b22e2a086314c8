//! Seeding configuration: record counts and probabilities.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SeedError, SeedResult};

/// Counts and probabilities driving a seeding run.
///
/// Every field has a default, so a JSON file only needs to name the values
/// it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub doctors: usize,
    pub patients: usize,
    pub visits: usize,

    pub doctor_active_probability: f64,
    pub patient_active_probability: f64,
    /// Chance that a treatable visit receives a treatment
    pub treatment_probability: f64,
    pub treatment_note_probability: f64,

    /// Total insert attempts per person before a national id collision aborts the run
    pub max_identifier_attempts: u32,

    /// Visits fall in `[now - visit_days_back, now + visit_days_ahead]`
    pub visit_days_back: i64,
    pub visit_days_ahead: i64,

    pub min_patient_age: u32,
    pub max_patient_age: u32,

    pub min_treatment_days: u32,
    pub max_treatment_days: u32,
    pub max_prescriptions_per_treatment: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            doctors: 20,
            patients: 50,
            visits: 100,
            doctor_active_probability: 0.90,
            patient_active_probability: 0.95,
            treatment_probability: 0.70,
            treatment_note_probability: 0.50,
            max_identifier_attempts: 5,
            visit_days_back: 730,
            visit_days_ahead: 60,
            min_patient_age: 1,
            max_patient_age: 90,
            min_treatment_days: 7,
            max_treatment_days: 90,
            max_prescriptions_per_treatment: 3,
        }
    }
}

impl SeedConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> SeedResult<Self> {
        let config: SeedConfig =
            serde_json::from_str(json).map_err(|e| SeedError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> SeedResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SeedError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Reject values the seeder cannot honour.
    pub fn validate(&self) -> SeedResult<()> {
        for (name, p) in [
            ("doctor_active_probability", self.doctor_active_probability),
            ("patient_active_probability", self.patient_active_probability),
            ("treatment_probability", self.treatment_probability),
            ("treatment_note_probability", self.treatment_note_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SeedError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }
        if self.max_identifier_attempts == 0 {
            return Err(SeedError::Config(
                "max_identifier_attempts must be at least 1".into(),
            ));
        }
        if self.visit_days_back < 0 || self.visit_days_ahead < 0 {
            return Err(SeedError::Config("visit window must not be negative".into()));
        }
        if self.min_patient_age > self.max_patient_age {
            return Err(SeedError::Config(format!(
                "min_patient_age {} exceeds max_patient_age {}",
                self.min_patient_age, self.max_patient_age
            )));
        }
        if self.min_treatment_days == 0 || self.min_treatment_days > self.max_treatment_days {
            return Err(SeedError::Config(format!(
                "treatment days must satisfy 1 <= {} <= {}",
                self.min_treatment_days, self.max_treatment_days
            )));
        }
        if self.max_prescriptions_per_treatment == 0 {
            return Err(SeedError::Config(
                "max_prescriptions_per_treatment must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SeedConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.doctors, 20);
        assert_eq!(config.patients, 50);
        assert_eq!(config.visits, 100);
        assert_eq!(config.max_identifier_attempts, 5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SeedConfig::from_json_str(r#"{"doctors": 3, "treatment_probability": 1.0}"#)
            .unwrap();
        assert_eq!(config.doctors, 3);
        assert_eq!(config.treatment_probability, 1.0);
        assert_eq!(config.patients, 50);
        assert_eq!(config.visit_days_back, 730);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            SeedConfig::from_json_str(r#"{"patient_active_probability": 1.5}"#),
            Err(SeedError::Config(_))
        ));
        assert!(matches!(
            SeedConfig::from_json_str(r#"{"max_identifier_attempts": 0}"#),
            Err(SeedError::Config(_))
        ));
        assert!(matches!(
            SeedConfig::from_json_str(r#"{"min_patient_age": 50, "max_patient_age": 20}"#),
            Err(SeedError::Config(_))
        ));
        assert!(matches!(
            SeedConfig::from_json_str("not json"),
            Err(SeedError::Config(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, r#"{"visits": 7}"#).unwrap();

        let config = SeedConfig::from_json_file(&path).unwrap();
        assert_eq!(config.visits, 7);

        let missing = SeedConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(SeedError::Config(_))));
    }
}
