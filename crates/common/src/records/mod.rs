//! Proof and definition records
//!
//! A record is what the store persists; a patch is what a client sends.
//! Every patch field is optional so one type serves both inserts (where
//! [`RecordPatch::validate_insert`] demands the required fields) and partial
//! updates (where [`merge`] overlays only the supplied fields).

mod definition;
mod merge;
mod proof;

pub use definition::{Definition, DefinitionPatch, Unfiltered};
pub use merge::merge;
pub use proof::{normalize_filter, Proof, ProofFilter, ProofPatch};

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use validator::{Validate, ValidationErrors};

/// Id carried by a record that has never been persisted
pub const UNSAVED_ID: i32 = 0;

/// Version a record receives when it is first persisted
pub const INITIAL_VERSION: i32 = 0;

/// A persisted entity with a surrogate id and an optimistic version counter.
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Client payload for creates and partial updates
    type Patch: RecordPatch<Self>;

    /// Predicate type accepted by [`crate::db::RecordStore::find_by`]
    type Filter: Debug + Send + Sync;

    /// Plural resource name, used for routes, logs and metric labels
    const RESOURCE: &'static str;

    fn id(&self) -> i32;

    fn set_id(&mut self, id: i32);

    fn version(&self) -> i32;

    fn set_version(&mut self, version: i32);

    fn matches(&self, filter: &Self::Filter) -> bool;

    fn is_saved(&self) -> bool {
        self.id() != UNSAVED_ID
    }
}

/// A client-supplied record with any subset of its fields populated.
pub trait RecordPatch<R>: Validate + Debug + DeserializeOwned + Send + Sync + 'static {
    /// Length checks on supplied fields plus presence of everything an
    /// insert requires.
    fn validate_insert(&self) -> Result<(), ValidationErrors>;

    /// Length checks on supplied fields, which also must not be blank.
    /// Absent fields are fine: they keep their stored value.
    fn validate_update(&self) -> Result<(), ValidationErrors>;

    /// Build an unsaved record from a patch that passed `validate_insert`.
    fn into_record(self) -> R;

    /// Overlay the supplied, non-empty fields onto a copy of `existing`.
    fn merge_onto(&self, existing: &R) -> R;
}

/// Adds `code` violations for `fields` on top of derived length checks.
pub(crate) fn reject(
    result: Result<(), ValidationErrors>,
    code: &'static str,
    fields: &[(&'static str, &'static str)],
) -> Result<(), ValidationErrors> {
    let mut errors = match result {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    for (field, message) in fields {
        let mut error = validator::ValidationError::new(code);
        error.message = Some((*message).into());
        errors.add(*field, error);
    }

    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Supplied, but only whitespace
pub(crate) fn is_supplied_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| v.trim().is_empty())
}

pub(crate) fn is_empty_list(value: &Option<Vec<String>>) -> bool {
    value.as_ref().map_or(true, Vec::is_empty)
}
