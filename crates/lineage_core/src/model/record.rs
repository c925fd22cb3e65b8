//! Association records linking a person to one biographical fact.
//!
//! # Responsibility
//! - Define the per-fact record types (identity fields, jobs, relatives,
//!   social statuses, schools, categories, pictures, achievements).
//! - Expose the shared `PersonLink` back-reference contract used by the
//!   link synchronizer and the repositories.
//!
//! # Invariants
//! - `person` may be `None` only while a record is detached in memory;
//!   persisted rows always carry an owning person.
//! - Required lookup references are encoded as non-optional ID fields.
//!
//! # See also
//! - docs/architecture/catalog-model.md

use crate::model::lookup::{
    CategoryId, CompanyId, SchoolId, SourceId, TypeIdentityFieldId, TypeRelativeId,
    TypeSocialStatusId,
};
use crate::model::person::PersonId;
use crate::model::{require_date_order, require_non_empty, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an association record.
pub type RecordId = Uuid;

/// Back-reference contract shared by every association record.
///
/// The owning side of each person/record link is the record's `person`
/// field; membership lists mirror it (see `model::links`).
pub trait PersonLink {
    /// Stable record ID.
    fn id(&self) -> RecordId;
    /// Current owning person, if attached.
    fn person(&self) -> Option<PersonId>;
    /// Rewrites the owning person back-reference.
    fn set_person(&mut self, person: Option<PersonId>);
}

macro_rules! impl_person_link {
    ($record:ty) => {
        impl PersonLink for $record {
            fn id(&self) -> RecordId {
                self.uuid
            }

            fn person(&self) -> Option<PersonId> {
                self.person
            }

            fn set_person(&mut self, person: Option<PersonId>) {
                self.person = person;
            }
        }
    };
}

/// One identity fact (e.g. an alias) typed by `type_identity_fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonIdentityField {
    pub uuid: RecordId,
    pub person: Option<PersonId>,
    /// Required identity field type.
    pub type_identity_field: TypeIdentityFieldId,
    /// The identity value itself. Required, non-empty.
    pub value: String,
}

impl PersonIdentityField {
    pub fn new(type_identity_field: TypeIdentityFieldId, value: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            person: None,
            type_identity_field,
            value: value.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("person_identity_field", "value", &self.value)
    }
}

impl_person_link!(PersonIdentityField);

/// One employment fact with required provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonJob {
    pub uuid: RecordId,
    pub person: Option<PersonId>,
    /// Job title. Required, non-empty.
    pub job: String,
    /// Optional employer.
    pub company: Option<CompanyId>,
    /// Required provenance reference.
    pub source: SourceId,
    /// Optional employment start, epoch milliseconds.
    pub start_date: Option<i64>,
    /// Optional employment end. Must not precede `start_date` when both set.
    pub end_date: Option<i64>,
}

impl PersonJob {
    pub fn new(job: impl Into<String>, source: SourceId) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            person: None,
            job: job.into(),
            company: None,
            source,
            start_date: None,
            end_date: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("person_job", "job", &self.job)?;
        require_date_order(self.start_date, self.end_date)
    }
}

impl_person_link!(PersonJob);

/// One kinship fact typed by `type_relatives`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRelative {
    pub uuid: RecordId,
    pub person: Option<PersonId>,
    /// Required kinship type.
    pub type_relative: TypeRelativeId,
    /// Relative's name. Required, non-empty.
    pub name: String,
    /// Whether the kinship is biological rather than legal/social.
    pub is_biological: bool,
}

impl PersonRelative {
    pub fn new(type_relative: TypeRelativeId, name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            person: None,
            type_relative,
            name: name.into(),
            is_biological: false,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("person_relative", "name", &self.name)
    }
}

impl_person_link!(PersonRelative);

/// One social status fact typed by `type_social_statuses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSocialStatus {
    pub uuid: RecordId,
    pub person: Option<PersonId>,
    /// Required status type.
    pub type_social_status: TypeSocialStatusId,
    /// Status label. Required, non-empty.
    pub name: String,
}

impl PersonSocialStatus {
    pub fn new(type_social_status: TypeSocialStatusId, name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            person: None,
            type_social_status,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("person_social_status", "name", &self.name)
    }
}

impl_person_link!(PersonSocialStatus);

/// One schooling fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSchool {
    pub uuid: RecordId,
    pub person: Option<PersonId>,
    /// Required school reference.
    pub school: SchoolId,
}

impl PersonSchool {
    pub fn new(school: SchoolId) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            person: None,
            school,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl_person_link!(PersonSchool);

/// One category membership fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonCategory {
    pub uuid: RecordId,
    pub person: Option<PersonId>,
    /// Required category reference.
    pub category: CategoryId,
    /// Optional free-form qualifier for this membership.
    pub name: Option<String>,
}

impl PersonCategory {
    pub fn new(category: CategoryId) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            person: None,
            category,
            name: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl_person_link!(PersonCategory);

/// One stored picture of a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonPicture {
    pub uuid: RecordId,
    pub person: Option<PersonId>,
    /// Storage path or URL of the image. Required, non-empty.
    pub path: String,
    /// Marks the portrait shown first in person views.
    pub is_main: bool,
}

impl PersonPicture {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            person: None,
            path: path.into(),
            is_main: false,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("person_picture", "path", &self.path)
    }
}

impl_person_link!(PersonPicture);

/// One notable achievement, with optional provenance and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub uuid: RecordId,
    pub person: Option<PersonId>,
    /// Achievement title. Required, non-empty.
    pub name: String,
    /// Optional provenance reference.
    pub source: Option<SourceId>,
    /// Optional achievement date, epoch milliseconds.
    pub achieved_at: Option<i64>,
}

impl Achievement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            person: None,
            name: name.into(),
            source: None,
            achieved_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("achievement", "name", &self.name)
    }
}

impl_person_link!(Achievement);
