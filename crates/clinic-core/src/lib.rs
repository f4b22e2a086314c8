//! Clinic Core Library
//!
//! Data model and storage for a medical clinic: specialties, doctors,
//! patients, medications, visits, treatments, prescriptions and lab reports.
//!
//! # Relationships
//!
//! ```text
//! Specialty ─< Doctor ─┐
//!                      ├─< Visit ─< Treatment ─< Prescription >─ Medication
//! Patient ─────────────┘     │
//!    └──────< LabReport >────┘ (optional)
//! ```
//!
//! A visit only carries a diagnosis once it is completed, and only a
//! completed visit with a diagnosis may receive treatments. Both rules are
//! checked by the models before a write and enforced again by the schema.
//!
//! # Modules
//!
//! - [`db`]: SQLite storage, list queries and nested detail views
//! - [`models`]: Domain types and validation
//! - [`rut`]: Chilean RUT national identifiers (check digit, parsing, generation)

pub mod db;
pub mod models;
pub mod rut;

// Re-export commonly used types
pub use db::{Database, DbError, DbResult, ListQuery};
pub use models::{
    BloodType, Doctor, LabReport, Medication, Patient, Prescription, Specialty, Treatment,
    ValidationError, Visit, VisitStatus,
};
pub use rut::{Rut, RutError};
