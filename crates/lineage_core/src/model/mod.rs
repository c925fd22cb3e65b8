//! Catalog domain model: persons, lookup rows, association records.
//!
//! # Responsibility
//! - Define the canonical data structures for the biographical catalog.
//! - Keep both sides of every person/record link consistent (`links`).
//!
//! # Invariants
//! - Every entity is identified by a stable UUID.
//! - A record's person back-reference and the owning membership list must
//!   agree after every mutation.
//!
//! # See also
//! - docs/architecture/catalog-model.md

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod links;
pub mod lookup;
pub mod person;
pub mod record;

/// Validation failure raised by entity `validate()` methods.
///
/// Surfaced before any persistence mutation; a failing entity is never
/// partially written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or whitespace-only.
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
    /// A record is being persisted without an owning person.
    MissingPerson { entity: &'static str },
    /// `start_date` is later than `end_date`.
    InvalidDateRange { start: i64, end: i64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { entity, field } => {
                write!(f, "{entity}.{field} must not be empty")
            }
            Self::MissingPerson { entity } => {
                write!(f, "{entity} requires an owning person before persistence")
            }
            Self::InvalidDateRange { start, end } => {
                write!(f, "start_date {start} is later than end_date {end}")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_non_empty(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}

pub(crate) fn require_date_order(
    start: Option<i64>,
    end: Option<i64>,
) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ValidationError::InvalidDateRange { start, end });
        }
    }
    Ok(())
}
