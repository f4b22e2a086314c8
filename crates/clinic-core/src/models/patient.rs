//! Patient models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ValidationError;
use crate::rut;

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    /// All eight groups, in display order.
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    /// Stored code, e.g. `AB+`.
    pub fn code(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BloodType::APositive => "A Positive",
            BloodType::ANegative => "A Negative",
            BloodType::BPositive => "B Positive",
            BloodType::BNegative => "B Negative",
            BloodType::AbPositive => "AB Positive",
            BloodType::AbNegative => "AB Negative",
            BloodType::OPositive => "O Positive",
            BloodType::ONegative => "O Negative",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BloodType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BloodType::ALL
            .into_iter()
            .find(|bt| bt.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::new("blood_type", format!("unknown blood type: {}", s)))
    }
}

/// A patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Store-assigned id, 0 until inserted
    pub id: i64,
    /// National identifier (RUT), unique
    pub national_id: String,
    pub name: String,
    pub surname: String,
    pub birth_date: NaiveDate,
    pub blood_type: BloodType,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub active: bool,
}

impl Patient {
    /// Create a new active patient with required fields.
    pub fn new(
        national_id: String,
        name: String,
        surname: String,
        birth_date: NaiveDate,
        blood_type: BloodType,
    ) -> Self {
        Self {
            id: 0,
            national_id,
            name,
            surname,
            birth_date,
            blood_type,
            email: None,
            phone: None,
            address: None,
            active: true,
        }
    }

    pub fn full_name(&self) -> String {
        super::full_name(&self.name, &self.surname)
    }

    /// Age in whole years on `today`.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        today.years_since(self.birth_date).unwrap_or(0)
    }

    /// Check the record before it is written.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        if let Err(e) = rut::parse(&self.national_id) {
            return Err(ValidationError::new("national_id", e.to_string()));
        }
        if self.birth_date > today {
            return Err(ValidationError::new(
                "birth_date",
                format!("{} is in the future", self.birth_date),
            ));
        }
        Ok(())
    }
}
