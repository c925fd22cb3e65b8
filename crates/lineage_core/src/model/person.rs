//! Person aggregate root.
//!
//! # Responsibility
//! - Define the canonical person record and its scalar fields.
//! - Provide explicit timestamp stamping for the storage save path.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another person.
//! - `created_at` is set exactly once, at first persistence.
//! - `updated_at` is refreshed by every subsequent persisted mutation.
//!
//! # See also
//! - docs/architecture/catalog-model.md

use crate::model::{require_non_empty, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a person.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PersonId = Uuid;

/// Aggregate root of the catalog.
///
/// Association records (jobs, relatives, schools, ...) reference a person by
/// `uuid`; the person row itself carries only identity fields. Timestamps are
/// `None` while the person has never been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Stable global ID used for linking and auditing.
    pub uuid: PersonId,
    /// Primary display name. Required, non-empty.
    pub name: String,
    /// Latin-script transcription of `name`, when it differs.
    pub romanized_name: Option<String>,
    /// Unix epoch milliseconds of first persistence. `None` = unpersisted.
    pub created_at: Option<i64>,
    /// Unix epoch milliseconds of the latest persisted mutation.
    pub updated_at: Option<i64>,
}

impl Person {
    /// Creates a new unpersisted person with a generated stable ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a new unpersisted person with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(uuid: PersonId, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
            romanized_name: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Checks scalar-field constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("person", "name", &self.name)
    }

    /// Returns whether this person has been persisted at least once.
    pub fn is_persisted(&self) -> bool {
        self.created_at.is_some()
    }

    /// First-persistence stamp: sets both timestamps to the same instant.
    ///
    /// Idempotent once persisted; `created_at` is never overwritten.
    pub fn stamp_created(&mut self, now_ms: i64) {
        if self.created_at.is_none() {
            self.created_at = Some(now_ms);
            self.updated_at = Some(now_ms);
        }
    }

    /// Update stamp: refreshes `updated_at` only.
    pub fn stamp_updated(&mut self, now_ms: i64) {
        self.updated_at = Some(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::Person;
    use crate::model::ValidationError;

    #[test]
    fn new_person_starts_unpersisted() {
        let person = Person::new("Ada");
        assert!(!person.is_persisted());
        assert_eq!(person.created_at, None);
        assert_eq!(person.updated_at, None);
    }

    #[test]
    fn validate_rejects_blank_name() {
        let person = Person::new("   ");
        assert_eq!(
            person.validate(),
            Err(ValidationError::EmptyField {
                entity: "person",
                field: "name",
            })
        );
    }

    #[test]
    fn stamp_created_sets_both_timestamps_once() {
        let mut person = Person::new("Ada");
        person.stamp_created(1_000);
        assert_eq!(person.created_at, Some(1_000));
        assert_eq!(person.updated_at, Some(1_000));

        person.stamp_created(2_000);
        assert_eq!(person.created_at, Some(1_000));
        assert_eq!(person.updated_at, Some(1_000));
    }

    #[test]
    fn stamp_updated_leaves_created_at_untouched() {
        let mut person = Person::new("Ada");
        person.stamp_created(1_000);
        person.stamp_updated(5_000);
        assert_eq!(person.created_at, Some(1_000));
        assert_eq!(person.updated_at, Some(5_000));
    }
}
