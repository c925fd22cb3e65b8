//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce entity `validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `MissingReference`)
//!   in addition to DB transport errors.

pub mod link_repo;
pub mod lookup_repo;
pub mod person_repo;
