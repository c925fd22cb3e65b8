//! Lookup/reference entities.
//!
//! # Responsibility
//! - Define the small, mostly-static tables referenced by association
//!   records (categories, relative types, companies, schools, ...).
//! - Define the richer `Source` provenance entity.
//!
//! # Invariants
//! - Lookup rows are identified by UUID and carry one required name.
//! - Lookup rows referenced by association records must not be deleted.

use crate::model::{require_non_empty, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type LookupId = Uuid;
pub type CategoryId = Uuid;
pub type TypeIdentityFieldId = Uuid;
pub type TypeRelativeId = Uuid;
pub type TypeSocialStatusId = Uuid;
pub type CompanyId = Uuid;
pub type SchoolId = Uuid;
pub type TypeSourceId = Uuid;
pub type SourceId = Uuid;

/// Discriminates the simple one-name lookup tables.
///
/// All of these share the `LookupEntry` row shape; the kind selects the
/// backing table in the repository layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    /// Thematic grouping for persons (e.g. "politician").
    Category,
    /// Identity field type (e.g. "alias").
    TypeIdentityField,
    /// Kinship type (e.g. "mother", "sibling").
    TypeRelative,
    /// Social status type (e.g. "nobility").
    TypeSocialStatus,
    /// Employer referenced by job records.
    Company,
    /// School referenced by schooling records.
    School,
    /// Provenance type referenced by sources (e.g. "census", "newspaper").
    TypeSource,
}

impl LookupKind {
    /// All simple lookup kinds, in schema order.
    pub const ALL: [LookupKind; 7] = [
        LookupKind::Category,
        LookupKind::TypeIdentityField,
        LookupKind::TypeRelative,
        LookupKind::TypeSocialStatus,
        LookupKind::Company,
        LookupKind::School,
        LookupKind::TypeSource,
    ];

    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Category => "categories",
            Self::TypeIdentityField => "type_identity_fields",
            Self::TypeRelative => "type_relatives",
            Self::TypeSocialStatus => "type_social_statuses",
            Self::Company => "companies",
            Self::School => "schools",
            Self::TypeSource => "type_sources",
        }
    }

    /// Singular entity label used in errors and log events.
    pub fn label(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::TypeIdentityField => "type_identity_field",
            Self::TypeRelative => "type_relative",
            Self::TypeSocialStatus => "type_social_status",
            Self::Company => "company",
            Self::School => "school",
            Self::TypeSource => "type_source",
        }
    }
}

/// Row shape shared by all simple lookup tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    /// Stable lookup row ID.
    pub uuid: LookupId,
    /// Display name. Required, non-empty.
    pub name: String,
}

impl LookupEntry {
    /// Creates a new lookup row with a generated stable ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }

    pub fn validate(&self, kind: LookupKind) -> Result<(), ValidationError> {
        require_non_empty(kind.label(), "name", &self.name)
    }
}

/// Provenance record documenting where a fact originated.
///
/// Required on job records; other association records may reference sources
/// optionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Stable source ID.
    pub uuid: SourceId,
    /// Human-readable citation or title. Required, non-empty.
    pub name: String,
    /// Optional provenance type (`type_sources` lookup).
    pub type_source: Option<TypeSourceId>,
    /// Optional link to the original document.
    pub url: Option<String>,
}

impl Source {
    /// Creates a new source with a generated stable ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            type_source: None,
            url: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("source", "name", &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::{LookupEntry, LookupKind, Source};

    #[test]
    fn lookup_kinds_map_to_distinct_tables() {
        let mut tables: Vec<&str> = LookupKind::ALL.iter().map(|kind| kind.table()).collect();
        tables.sort_unstable();
        tables.dedup();
        assert_eq!(tables.len(), LookupKind::ALL.len());
    }

    #[test]
    fn blank_lookup_name_is_rejected() {
        let entry = LookupEntry::new("");
        assert!(entry.validate(LookupKind::Category).is_err());
        assert!(Source::new(" ").validate().is_err());
    }
}
