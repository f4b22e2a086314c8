//! Medical visit models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Visit lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    /// Scheduled, not yet attended
    Pending,
    /// Attended; carries a diagnosis
    Completed,
    /// Called off
    Cancelled,
}

impl VisitStatus {
    pub const ALL: [VisitStatus; 3] = [
        VisitStatus::Pending,
        VisitStatus::Completed,
        VisitStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Pending => "pending",
            VisitStatus::Completed => "completed",
            VisitStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            VisitStatus::Pending => "Pending",
            VisitStatus::Completed => "Completed",
            VisitStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(VisitStatus::Pending),
            "completed" => Ok(VisitStatus::Completed),
            "cancelled" => Ok(VisitStatus::Cancelled),
            other => Err(ValidationError::new(
                "status",
                format!("unknown visit status: {}", other),
            )),
        }
    }
}

/// An encounter between a patient and a doctor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    /// Store-assigned id, 0 until inserted
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub visit_datetime: DateTime<Utc>,
    /// Reason for the visit
    pub reason: String,
    /// Only present on completed visits
    pub diagnosis: Option<String>,
    pub status: VisitStatus,
}

impl Visit {
    /// Create a new pending visit.
    pub fn new(
        patient_id: i64,
        doctor_id: i64,
        visit_datetime: DateTime<Utc>,
        reason: String,
    ) -> Self {
        Self {
            id: 0,
            patient_id,
            doctor_id,
            visit_datetime,
            reason,
            diagnosis: None,
            status: VisitStatus::Pending,
        }
    }

    /// Completed with a diagnosis, i.e. eligible for treatments.
    pub fn is_treatable(&self) -> bool {
        self.status == VisitStatus::Completed && self.diagnosis.is_some()
    }

    /// Check the record before it is written.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.diagnosis.is_some() && self.status != VisitStatus::Completed {
            return Err(ValidationError::new(
                "diagnosis",
                format!("not allowed on a {} visit", self.status),
            ));
        }
        Ok(())
    }
}
