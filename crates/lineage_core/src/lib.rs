//! Core domain logic for the Lineage biographical catalog.
//! This crate is the single source of truth for catalog invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::links::LinkSet;
pub use model::lookup::{LookupEntry, LookupId, LookupKind, Source, SourceId};
pub use model::person::{Person, PersonId};
pub use model::record::{
    Achievement, PersonCategory, PersonIdentityField, PersonJob, PersonLink, PersonPicture,
    PersonRelative, PersonSchool, PersonSocialStatus, RecordId,
};
pub use model::ValidationError;
pub use projection::{
    person_summary, PersonCreateInput, PersonReadView, PersonSummary, PersonUpdateInput,
};
pub use repo::link_repo::{LinkRow, SqliteLinkRepository};
pub use repo::lookup_repo::{LookupRepository, SqliteLookupRepository};
pub use repo::person_repo::{
    NameOrder, PersonListQuery, PersonRepository, RepoError, RepoResult, SqlitePersonRepository,
};
pub use service::catalog_service::{CatalogService, CatalogServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
