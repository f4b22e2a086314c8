//! Doctor models.

use serde::{Deserialize, Serialize};

use super::ValidationError;
use crate::rut;

/// A doctor attached to one specialty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    /// Store-assigned id, 0 until inserted
    pub id: i64,
    pub name: String,
    pub surname: String,
    /// National identifier (RUT), unique
    pub national_id: String,
    /// Contact email, unique
    pub email: String,
    pub phone: Option<String>,
    pub active: bool,
    /// Specialty id
    pub specialty_id: i64,
}

impl Doctor {
    /// Create a new active doctor with required fields.
    pub fn new(
        name: String,
        surname: String,
        national_id: String,
        email: String,
        specialty_id: i64,
    ) -> Self {
        Self {
            id: 0,
            name,
            surname,
            national_id,
            email,
            phone: None,
            active: true,
            specialty_id,
        }
    }

    pub fn full_name(&self) -> String {
        super::full_name(&self.name, &self.surname)
    }

    /// Check the record before it is written.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Err(e) = rut::parse(&self.national_id) {
            return Err(ValidationError::new("national_id", e.to_string()));
        }
        if !self.email.contains('@') {
            return Err(ValidationError::new("email", "not an email address"));
        }
        Ok(())
    }
}
