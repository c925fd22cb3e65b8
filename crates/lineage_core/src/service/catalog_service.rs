//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for person, lookup and record use-cases.
//! - Stamp timestamps from the injected clock on every save path.
//! - Assemble full-graph read projections.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Every rejected write leaves persisted state untouched.

use crate::clock::Clock;
use crate::model::lookup::{LookupEntry, LookupId, LookupKind, Source, SourceId};
use crate::model::person::{Person, PersonId};
use crate::model::record::{
    Achievement, PersonCategory, PersonIdentityField, PersonJob, PersonPicture, PersonRelative,
    PersonSchool, PersonSocialStatus, RecordId,
};
use crate::model::ValidationError;
use crate::projection::{
    achievement_view, category_view, identity_field_view, job_view, person_summary, picture_view,
    relative_view, school_view, social_status_view, LookupRef, PersonCreateInput, PersonReadView,
    PersonSummary, PersonUpdateInput, PictureView,
};
use crate::repo::link_repo::{LinkRow, SqliteLinkRepository};
use crate::repo::lookup_repo::{LookupRepository, SqliteLookupRepository};
use crate::repo::person_repo::{
    PersonListQuery, PersonRepository, RepoError, SqlitePersonRepository,
};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum CatalogServiceError {
    /// Target person does not exist.
    PersonNotFound(PersonId),
    /// Target record or lookup row does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Entity validation rejected the write.
    Validation(ValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for CatalogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent catalog state: {details}")
            }
        }
    }
}

impl Error for CatalogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CatalogServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "person",
                id,
            } => Self::PersonNotFound(id),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, CatalogServiceError>;

/// Use-case facade over the catalog repositories.
///
/// Holds one connection and one clock; repositories are constructed per
/// call against the shared connection.
pub struct CatalogService<'conn, C: Clock> {
    conn: &'conn Connection,
    clock: C,
}

impl<'conn, C: Clock> CatalogService<'conn, C> {
    /// Creates a service over a migrated/ready connection.
    pub fn new(conn: &'conn Connection, clock: C) -> Self {
        Self { conn, clock }
    }

    fn people(&self) -> ServiceResult<SqlitePersonRepository<'conn>> {
        Ok(SqlitePersonRepository::try_new(self.conn)?)
    }

    fn lookups(&self) -> ServiceResult<SqliteLookupRepository<'conn>> {
        Ok(SqliteLookupRepository::try_new(self.conn)?)
    }

    fn records<R: LinkRow>(&self) -> ServiceResult<SqliteLinkRepository<'conn, R>> {
        Ok(SqliteLinkRepository::try_new(self.conn)?)
    }

    fn require_person(&self, id: PersonId) -> ServiceResult<Person> {
        self.people()?
            .get_person(id)?
            .ok_or(CatalogServiceError::PersonNotFound(id))
    }

    // --- person use-cases -------------------------------------------------

    /// Creates a person from write input; both timestamps are stamped with
    /// the same instant.
    pub fn create_person(&self, input: PersonCreateInput) -> ServiceResult<PersonSummary> {
        let mut person = input.into_person();
        self.people()?
            .create_person(&mut person, self.clock.now_ms())?;
        info!(
            "event=person_create module=service status=ok person={}",
            person.uuid
        );
        Ok(person_summary(&person))
    }

    /// Applies update input onto an existing person and refreshes
    /// `updated_at`.
    pub fn update_person(
        &self,
        id: PersonId,
        input: &PersonUpdateInput,
    ) -> ServiceResult<PersonSummary> {
        let mut person = self.require_person(id)?;
        input.apply(&mut person);
        self.people()?
            .update_person(&mut person, self.clock.now_ms())?;
        Ok(person_summary(&person))
    }

    pub fn get_person(&self, id: PersonId) -> ServiceResult<Option<Person>> {
        Ok(self.people()?.get_person(id)?)
    }

    pub fn list_people(&self, query: &PersonListQuery) -> ServiceResult<Vec<PersonSummary>> {
        let people = self.people()?.list_people(query)?;
        Ok(people.iter().map(person_summary).collect())
    }

    pub fn count_people(&self) -> ServiceResult<u64> {
        Ok(self.people()?.count_people()?)
    }

    /// Deletes a person; the storage layer cascades its association rows.
    pub fn delete_person(&self, id: PersonId) -> ServiceResult<()> {
        self.people()?.delete_person(id)?;
        info!("event=person_delete module=service status=ok person={id}");
        Ok(())
    }

    // --- association record use-cases -------------------------------------

    /// Attaches a record to `person` and persists it.
    ///
    /// The record's back-reference is set before the insert, so the stored
    /// row and the in-memory record agree on ownership.
    pub fn add_record<R: LinkRow>(
        &self,
        person: PersonId,
        record: &mut R,
    ) -> ServiceResult<RecordId> {
        self.require_person(person)?;
        record.set_person(Some(person));
        Ok(self.records::<R>()?.create(record)?)
    }

    pub fn get_record<R: LinkRow>(&self, id: RecordId) -> ServiceResult<Option<R>> {
        Ok(self.records::<R>()?.get(id)?)
    }

    pub fn list_records<R: LinkRow>(&self, person: PersonId) -> ServiceResult<Vec<R>> {
        Ok(self.records::<R>()?.list_for_person(person)?)
    }

    pub fn update_record<R: LinkRow>(&self, record: &R) -> ServiceResult<()> {
        Ok(self.records::<R>()?.update(record)?)
    }

    /// Moves a record to a new owning person in one write.
    pub fn reassign_record<R: LinkRow>(
        &self,
        id: RecordId,
        to_person: PersonId,
    ) -> ServiceResult<()> {
        self.require_person(to_person)?;
        Ok(self.records::<R>()?.reassign(id, to_person)?)
    }

    pub fn remove_record<R: LinkRow>(&self, id: RecordId) -> ServiceResult<()> {
        Ok(self.records::<R>()?.delete(id)?)
    }

    // --- lookup/source use-cases ------------------------------------------

    pub fn create_lookup(
        &self,
        kind: LookupKind,
        name: impl Into<String>,
    ) -> ServiceResult<LookupEntry> {
        let entry = LookupEntry::new(name);
        self.lookups()?.create_entry(kind, &entry)?;
        Ok(entry)
    }

    pub fn list_lookup(&self, kind: LookupKind) -> ServiceResult<Vec<LookupEntry>> {
        Ok(self.lookups()?.list_entries(kind)?)
    }

    pub fn rename_lookup(
        &self,
        kind: LookupKind,
        id: LookupId,
        name: &str,
    ) -> ServiceResult<()> {
        Ok(self.lookups()?.rename_entry(kind, id, name)?)
    }

    pub fn delete_lookup(&self, kind: LookupKind, id: LookupId) -> ServiceResult<()> {
        Ok(self.lookups()?.delete_entry(kind, id)?)
    }

    pub fn create_source(&self, source: &Source) -> ServiceResult<SourceId> {
        Ok(self.lookups()?.create_source(source)?)
    }

    pub fn get_source(&self, id: SourceId) -> ServiceResult<Option<Source>> {
        Ok(self.lookups()?.get_source(id)?)
    }

    pub fn list_sources(&self) -> ServiceResult<Vec<Source>> {
        Ok(self.lookups()?.list_sources()?)
    }

    pub fn update_source(&self, source: &Source) -> ServiceResult<()> {
        Ok(self.lookups()?.update_source(source)?)
    }

    pub fn delete_source(&self, id: SourceId) -> ServiceResult<()> {
        Ok(self.lookups()?.delete_source(id)?)
    }

    // --- projections ------------------------------------------------------

    /// Assembles the full-graph read view of one person.
    ///
    /// Lookup references are resolved to `{id, name}` pairs; a dangling
    /// reference means the schema's foreign keys were bypassed and is
    /// surfaced as `InconsistentState`.
    pub fn person_read_view(&self, id: PersonId) -> ServiceResult<PersonReadView> {
        let person = self.require_person(id)?;
        let lookups = self.lookups()?;

        let mut identity_fields = Vec::new();
        for record in self.list_records::<PersonIdentityField>(id)? {
            let field_type = self.lookup_ref(
                &lookups,
                LookupKind::TypeIdentityField,
                record.type_identity_field,
            )?;
            identity_fields.push(identity_field_view(&record, field_type));
        }

        let mut jobs = Vec::new();
        for record in self.list_records::<PersonJob>(id)? {
            let company = match record.company {
                Some(company_id) => {
                    Some(self.lookup_ref(&lookups, LookupKind::Company, company_id)?)
                }
                None => None,
            };
            let source = self.source_ref(&lookups, record.source)?;
            jobs.push(job_view(&record, company, source));
        }

        let mut relatives = Vec::new();
        for record in self.list_records::<PersonRelative>(id)? {
            let relative_type =
                self.lookup_ref(&lookups, LookupKind::TypeRelative, record.type_relative)?;
            relatives.push(relative_view(&record, relative_type));
        }

        let mut social_statuses = Vec::new();
        for record in self.list_records::<PersonSocialStatus>(id)? {
            let status_type = self.lookup_ref(
                &lookups,
                LookupKind::TypeSocialStatus,
                record.type_social_status,
            )?;
            social_statuses.push(social_status_view(&record, status_type));
        }

        let mut schools = Vec::new();
        for record in self.list_records::<PersonSchool>(id)? {
            let school = self.lookup_ref(&lookups, LookupKind::School, record.school)?;
            schools.push(school_view(&record, school));
        }

        let mut categories = Vec::new();
        for record in self.list_records::<PersonCategory>(id)? {
            let category = self.lookup_ref(&lookups, LookupKind::Category, record.category)?;
            categories.push(category_view(&record, category));
        }

        let pictures = self
            .list_records::<PersonPicture>(id)?
            .iter()
            .map(picture_view)
            .collect();

        let mut achievements = Vec::new();
        for record in self.list_records::<Achievement>(id)? {
            let source = match record.source {
                Some(source_id) => Some(self.source_ref(&lookups, source_id)?),
                None => None,
            };
            achievements.push(achievement_view(&record, source));
        }

        Ok(PersonReadView {
            person: person_summary(&person),
            identity_fields,
            jobs,
            relatives,
            social_statuses,
            schools,
            categories,
            pictures,
            achievements,
        })
    }

    /// Returns the person's main portrait, falling back to the first stored
    /// picture when none is flagged.
    pub fn main_picture(&self, id: PersonId) -> ServiceResult<Option<PictureView>> {
        self.require_person(id)?;
        let pictures = self.list_records::<PersonPicture>(id)?;
        let main = pictures
            .iter()
            .find(|picture| picture.is_main)
            .or_else(|| pictures.first());
        Ok(main.map(picture_view))
    }

    fn lookup_ref(
        &self,
        lookups: &SqliteLookupRepository<'conn>,
        kind: LookupKind,
        id: LookupId,
    ) -> ServiceResult<LookupRef> {
        let entry = lookups.get_entry(kind, id)?.ok_or(
            CatalogServiceError::InconsistentState("association row references a missing lookup"),
        )?;
        Ok(LookupRef::from_entry(&entry))
    }

    fn source_ref(
        &self,
        lookups: &SqliteLookupRepository<'conn>,
        id: SourceId,
    ) -> ServiceResult<LookupRef> {
        let source = lookups.get_source(id)?.ok_or(
            CatalogServiceError::InconsistentState("association row references a missing source"),
        )?;
        Ok(LookupRef::from_source(&source))
    }
}
