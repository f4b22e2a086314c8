//! Laboratory report models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// A lab exam requested for a patient, optionally from a visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabReport {
    /// Store-assigned id, 0 until inserted
    pub id: i64,
    pub patient_id: i64,
    /// Visit that requested the exam; cleared if the visit is deleted
    pub visit_id: Option<i64>,
    /// e.g. "Complete blood count"
    pub exam_type: String,
    pub requested_on: NaiveDate,
    pub result_on: Option<NaiveDate>,
    pub results: String,
    /// Technician or laboratory
    pub analysed_by: Option<String>,
}

impl LabReport {
    pub fn new(patient_id: i64, exam_type: String, requested_on: NaiveDate) -> Self {
        Self {
            id: 0,
            patient_id,
            visit_id: None,
            exam_type,
            requested_on,
            result_on: None,
            results: String::new(),
            analysed_by: None,
        }
    }

    /// Whether results have been delivered.
    pub fn is_resulted(&self) -> bool {
        self.result_on.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.exam_type.trim().is_empty() {
            return Err(ValidationError::new("exam_type", "must not be empty"));
        }
        if let Some(result_on) = self.result_on {
            if result_on < self.requested_on {
                return Err(ValidationError::new(
                    "result_on",
                    format!("{} precedes request date {}", result_on, self.requested_on),
                ));
            }
        }
        Ok(())
    }
}
