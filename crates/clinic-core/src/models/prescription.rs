//! Prescription linking a treatment to a medication.

use serde::{Deserialize, Serialize};

/// An instruction to take one medication as part of a treatment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    /// Store-assigned id, 0 until inserted
    pub id: i64,
    pub treatment_id: i64,
    pub medication_id: i64,
    /// e.g. "2 tablets"
    pub dosage: String,
    /// e.g. "every 8 hours"
    pub frequency: String,
    /// e.g. "10 days"
    pub duration: String,
}

impl Prescription {
    pub fn new(
        treatment_id: i64,
        medication_id: i64,
        dosage: String,
        frequency: String,
        duration: String,
    ) -> Self {
        Self {
            id: 0,
            treatment_id,
            medication_id,
            dosage,
            frequency,
            duration,
        }
    }
}
