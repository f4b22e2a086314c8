//! Treatment plan attached to a completed visit.

use serde::{Deserialize, Serialize};

use super::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Treatment {
    /// Store-assigned id, 0 until inserted
    pub id: i64,
    pub visit_id: i64,
    pub description: String,
    pub duration_days: u32,
    pub notes: Option<String>,
}

impl Treatment {
    pub fn new(visit_id: i64, description: String, duration_days: u32) -> Self {
        Self {
            id: 0,
            visit_id,
            description,
            duration_days,
            notes: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.duration_days == 0 {
            return Err(ValidationError::new("duration_days", "must be positive"));
        }
        Ok(())
    }
}
