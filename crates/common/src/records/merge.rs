//! Record merge engine
//!
//! Partial updates overlay a patch onto the stored record. Only supplied,
//! non-empty values win; `id` and `version` always come from the stored
//! record. The engine is pure: bumping the version and persisting are the
//! caller's job.

use super::{Record, RecordPatch};

/// Merge `partial` onto a copy of `existing`.
pub fn merge<R: Record>(partial: &R::Patch, existing: &R) -> R {
    partial.merge_onto(existing)
}

/// Overwrite `target` when `value` holds a non-empty string.
pub(crate) fn overlay_text(target: &mut String, value: &Option<String>) {
    if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
        target.clone_from(value);
    }
}

/// Overwrite `target` when `value` holds a non-empty list.
pub(crate) fn overlay_list(target: &mut Vec<String>, value: &Option<Vec<String>>) {
    if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
        target.clone_from(value);
    }
}

/// Same as [`overlay_list`] for optional columns.
pub(crate) fn overlay_optional_list(target: &mut Option<Vec<String>>, value: &Option<Vec<String>>) {
    if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
        *target = Some(value.clone());
    }
}
