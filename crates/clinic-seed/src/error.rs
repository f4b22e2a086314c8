//! Seeding errors.

use clinic_core::DbError;
use thiserror::Error;

use crate::store::EntityKind;

/// Errors that abort a seeding run.
///
/// Rejected records are not errors at this level; they are counted as
/// failed in the stage summary and the stage carries on.
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Store error: {0}")]
    Store(#[from] DbError),

    #[error("No free national identifier for {entity} after {attempts} attempts")]
    IdentifierExhausted { entity: EntityKind, attempts: u32 },

    #[error("Invalid seeding configuration: {0}")]
    Config(String),
}

pub type SeedResult<T> = Result<T, SeedError>;
