//! Immutable set toggling shared by the sidebar facets and the quick filter pills.

use std::collections::BTreeSet;

/// Return a new set with `id` removed if present, added otherwise.
///
/// The input is never modified, so callers can detect changes by comparing
/// the old and new sets. Toggles of distinct ids commute.
pub fn toggle<T: Ord + Clone>(active: &BTreeSet<T>, id: &T) -> BTreeSet<T> {
    let mut next = active.clone();
    if !next.remove(id) {
        next.insert(id.clone());
    }
    next
}

/// Toggle a free-text facet value, comparing case-insensitively.
///
/// Values are stored lowercased so a facet set never holds two spellings of
/// the same value.
pub fn toggle_facet(active: &BTreeSet<String>, value: &str) -> BTreeSet<String> {
    let folded = value.trim().to_lowercase();
    if folded.is_empty() {
        return active.clone();
    }
    toggle(active, &folded)
}
