//! Bidirectional person/record link synchronizer.
//!
//! # Responsibility
//! - Keep membership lists and record back-references consistent through
//!   every attach/detach, inside one mutation call.
//!
//! # Invariants
//! - A membership list never holds the same record twice.
//! - After `attach`, the record's back-reference points at the new member's
//!   person.
//! - `detach` nulls the back-reference only while it still points at the
//!   detaching person; a record reassigned elsewhere keeps its new owner.
//!
//! # See also
//! - docs/architecture/catalog-model.md

use crate::model::person::PersonId;
use crate::model::record::{PersonLink, RecordId};
use std::collections::BTreeMap;

/// Membership side of one person-to-record collection.
///
/// Records live outside this structure and carry the owning side (their
/// `person` field); `LinkSet` holds only the inverse membership lists. The
/// two are mutated together by `attach`/`detach`, so no object-graph cycle
/// is ever formed. Callers keep one `LinkSet` per collection kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    members: BTreeMap<PersonId, Vec<RecordId>>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `record` to `person`'s collection and points its back-reference
    /// at `person`.
    ///
    /// Returns `false` without any state change when the record is already
    /// a member (idempotent by record identity).
    pub fn attach<R: PersonLink>(&mut self, person: PersonId, record: &mut R) -> bool {
        let list = self.members.entry(person).or_default();
        if list.contains(&record.id()) {
            return false;
        }
        list.push(record.id());
        record.set_person(Some(person));
        true
    }

    /// Removes `record` from `person`'s collection.
    ///
    /// Returns `false` without any state change when the record is not a
    /// member. The back-reference is nulled only if it still equals
    /// `person`; a stale detach after reassignment must not clobber the new
    /// owner.
    pub fn detach<R: PersonLink>(&mut self, person: PersonId, record: &mut R) -> bool {
        let Some(list) = self.members.get_mut(&person) else {
            return false;
        };
        let Some(position) = list.iter().position(|id| *id == record.id()) else {
            return false;
        };
        list.remove(position);
        if record.person() == Some(person) {
            record.set_person(None);
        }
        true
    }

    /// Record IDs currently held by `person`, in attach order.
    pub fn members_of(&self, person: PersonId) -> &[RecordId] {
        self.members
            .get(&person)
            .map_or(&[], |list| list.as_slice())
    }

    /// Whether `record_id` is in `person`'s collection.
    pub fn is_member(&self, person: PersonId, record_id: RecordId) -> bool {
        self.members_of(person).contains(&record_id)
    }
}
