//! Medication stock item.

use serde::{Deserialize, Serialize};

use super::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    /// Store-assigned id, 0 until inserted
    pub id: i64,
    /// Unique name
    pub name: String,
    pub manufacturer: String,
    /// Units in stock
    pub stock: u32,
    /// Price per unit
    pub unit_price: f64,
}

impl Medication {
    pub fn new(name: String, manufacturer: String, stock: u32, unit_price: f64) -> Self {
        Self {
            id: 0,
            name,
            manufacturer,
            stock,
            unit_price,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(ValidationError::new(
                "unit_price",
                format!("must be a non-negative amount, got {}", self.unit_price),
            ));
        }
        Ok(())
    }
}
