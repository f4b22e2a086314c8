//! Medical specialty.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// A medical field a doctor practices in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Specialty {
    /// Store-assigned id, 0 until inserted
    pub id: i64,
    /// Unique name
    pub name: String,
    pub description: Option<String>,
}

impl Specialty {
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            id: 0,
            name,
            description,
        }
    }

    /// Check the record before it is written.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        Ok(())
    }
}
