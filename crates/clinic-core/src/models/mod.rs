//! Domain models for the clinic data backend.

mod detail;
mod doctor;
mod lab_report;
mod medication;
mod patient;
mod prescription;
mod specialty;
mod treatment;
mod visit;

pub use detail::*;
pub use doctor::*;
pub use lab_report::*;
pub use medication::*;
pub use patient::*;
pub use prescription::*;
pub use specialty::*;
pub use treatment::*;
pub use visit::*;

use thiserror::Error;

/// A record that breaks a domain rule before it reaches the store.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Offending field
    pub field: &'static str,
    /// Human-readable reason
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Join a first name and surname for display.
pub(crate) fn full_name(name: &str, surname: &str) -> String {
    format!("{} {}", name, surname)
}
