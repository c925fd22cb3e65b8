//! Named read/write projections for catalog entities.
//!
//! # Responsibility
//! - Define the plain field subsets exposed to API/UI layers, decoupled
//!   from the entity definitions.
//! - Keep projection construction explicit: one named function per view,
//!   no introspection.
//!
//! # Invariants
//! - Read views never expose storage details (column names, row state).
//! - Write inputs carry only the fields a caller may set.

use crate::model::lookup::{LookupEntry, Source};
use crate::model::person::Person;
use crate::model::record::{
    Achievement, PersonCategory, PersonIdentityField, PersonJob, PersonPicture, PersonRelative,
    PersonSchool, PersonSocialStatus,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resolved reference to a lookup row: ID plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupRef {
    pub id: Uuid,
    pub name: String,
}

impl LookupRef {
    pub fn from_entry(entry: &LookupEntry) -> Self {
        Self {
            id: entry.uuid,
            name: entry.name.clone(),
        }
    }

    pub fn from_source(source: &Source) -> Self {
        Self {
            id: source.uuid,
            name: source.name.clone(),
        }
    }
}

/// Listing/read subset of a person, without collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonSummary {
    pub id: Uuid,
    pub name: String,
    pub romanized_name: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

/// Builds the listing projection of one person.
pub fn person_summary(person: &Person) -> PersonSummary {
    PersonSummary {
        id: person.uuid,
        name: person.name.clone(),
        romanized_name: person.romanized_name.clone(),
        created_at: person.created_at,
        updated_at: person.updated_at,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityFieldView {
    pub id: Uuid,
    pub value: String,
    pub type_identity_field: LookupRef,
}

pub fn identity_field_view(
    record: &PersonIdentityField,
    field_type: LookupRef,
) -> IdentityFieldView {
    IdentityFieldView {
        id: record.uuid,
        value: record.value.clone(),
        type_identity_field: field_type,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobView {
    pub id: Uuid,
    pub job: String,
    pub company: Option<LookupRef>,
    pub source: LookupRef,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

pub fn job_view(record: &PersonJob, company: Option<LookupRef>, source: LookupRef) -> JobView {
    JobView {
        id: record.uuid,
        job: record.job.clone(),
        company,
        source,
        start_date: record.start_date,
        end_date: record.end_date,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelativeView {
    pub id: Uuid,
    pub name: String,
    pub is_biological: bool,
    pub type_relative: LookupRef,
}

pub fn relative_view(record: &PersonRelative, relative_type: LookupRef) -> RelativeView {
    RelativeView {
        id: record.uuid,
        name: record.name.clone(),
        is_biological: record.is_biological,
        type_relative: relative_type,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialStatusView {
    pub id: Uuid,
    pub name: String,
    pub type_social_status: LookupRef,
}

pub fn social_status_view(record: &PersonSocialStatus, status_type: LookupRef) -> SocialStatusView {
    SocialStatusView {
        id: record.uuid,
        name: record.name.clone(),
        type_social_status: status_type,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolView {
    pub id: Uuid,
    pub school: LookupRef,
}

pub fn school_view(record: &PersonSchool, school: LookupRef) -> SchoolView {
    SchoolView {
        id: record.uuid,
        school,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryView {
    pub id: Uuid,
    pub name: Option<String>,
    pub category: LookupRef,
}

pub fn category_view(record: &PersonCategory, category: LookupRef) -> CategoryView {
    CategoryView {
        id: record.uuid,
        name: record.name.clone(),
        category,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PictureView {
    pub id: Uuid,
    pub path: String,
    pub is_main: bool,
}

pub fn picture_view(record: &PersonPicture) -> PictureView {
    PictureView {
        id: record.uuid,
        path: record.path.clone(),
        is_main: record.is_main,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementView {
    pub id: Uuid,
    pub name: String,
    pub source: Option<LookupRef>,
    pub achieved_at: Option<i64>,
}

pub fn achievement_view(record: &Achievement, source: Option<LookupRef>) -> AchievementView {
    AchievementView {
        id: record.uuid,
        name: record.name.clone(),
        source,
        achieved_at: record.achieved_at,
    }
}

/// Full-graph read projection of one person and all owned collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonReadView {
    #[serde(flatten)]
    pub person: PersonSummary,
    pub identity_fields: Vec<IdentityFieldView>,
    pub jobs: Vec<JobView>,
    pub relatives: Vec<RelativeView>,
    pub social_statuses: Vec<SocialStatusView>,
    pub schools: Vec<SchoolView>,
    pub categories: Vec<CategoryView>,
    pub pictures: Vec<PictureView>,
    pub achievements: Vec<AchievementView>,
}

/// Fields writable when creating a person.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersonCreateInput {
    pub name: String,
    #[serde(default)]
    pub romanized_name: Option<String>,
}

impl PersonCreateInput {
    /// Materializes an unpersisted person from the input.
    pub fn into_person(self) -> Person {
        let mut person = Person::new(self.name);
        person.romanized_name = self.romanized_name;
        person
    }
}

/// Fields writable when updating a person. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersonUpdateInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub romanized_name: Option<String>,
}

impl PersonUpdateInput {
    /// Applies the provided fields onto an existing person.
    pub fn apply(&self, person: &mut Person) {
        if let Some(name) = &self.name {
            person.name = name.clone();
        }
        if let Some(romanized_name) = &self.romanized_name {
            person.romanized_name = Some(romanized_name.clone());
        }
    }
}
