//! Invariant catalog for [`crate::MarkerStore`].
#![allow(dead_code)]

/// Markers of any type other than text match must never overlap or abut within a list.
///
/// - Enforced in: `MarkerList::insert` (absorption loop)
/// - Tested by: [`crate::store::tests::test_merge_overlapping_spelling`], `store_properties::prop_merge_invariant_holds`
/// - Failure symptom: Duplicate underlines, and removal scans that stop early because `end` offsets are no longer monotonic.
pub(crate) const NO_OVERLAP_FOR_MERGING_TYPES: () = ();

/// Text-match markers may overlap, but their list must stay sorted by start.
///
/// - Enforced in: `MarkerList::insert` (start-ordered insertion)
/// - Tested by: [`crate::store::tests::test_text_match_markers_overlap`]
/// - Failure symptom: Search highlights disappear when a query matches overlapping text, or "next match" skips hits.
pub(crate) const TEXT_MATCH_SORTED_OVERLAP_ALLOWED: () = ();

/// Empty markers are never stored.
///
/// - Enforced in: [`crate::MarkerStore::add_marker`], `MarkerList::remove_overlapping` (residue only when non-empty)
/// - Tested by: [`crate::store::tests::test_add_empty_marker_is_noop`]
/// - Failure symptom: Zero-width entries keep node entries alive forever.
pub(crate) const NO_EMPTY_MARKERS: () = ();

/// Emptied lists are dropped, emptied node entries are dropped.
///
/// - Enforced in: `MarkerStore::prune_node`, [`crate::MarkerStore::remove_markers`], [`crate::MarkerStore::remove_markers_matching`]
/// - Tested by: [`crate::store::tests::test_remove_partial_overlap_drops_node_entry`]
/// - Failure symptom: The store never becomes empty, so the summary mask is never reset and every bulk operation scans.
pub(crate) const EMPTY_ENTRIES_DROPPED: () = ();

/// The summary mask admits every stored type, and is reset exactly when the store empties.
///
/// - Enforced in: [`crate::MarkerStore::add_marker`], `MarkerStore::reset_mask_if_empty`
/// - Tested by: [`crate::store::tests::test_summary_mask_resets_on_empty`], `store_properties::prop_summary_mask_consistent`
/// - Failure symptom: Bulk removals skip stored markers (mask too small) or never short-circuit (mask never reset).
pub(crate) const SUMMARY_MASK_SUPERSET: () = ();

/// Shifts only move markers starting at or after the shift offset.
///
/// - Enforced in: `MarkerList::shift_from`
/// - Tested by: [`crate::store::tests::test_shift_boundary_is_inclusive`]
/// - Failure symptom: Markers drift off the words they annotate after typing inside them.
pub(crate) const SHIFT_BOUNDARY_INCLUSIVE: () = ();
