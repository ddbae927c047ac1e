//! Text-range annotation store.
//!
//! [`Marker`]s annotate half-open character ranges of document text nodes with a
//! [`MarkerType`](lectern_primitives::MarkerType). The [`MarkerStore`] keeps one sorted
//! [`MarkerList`] per node and type, merging overlapping markers of every type except
//! text matches.

pub mod invariants;
pub mod list;
pub mod marker;
pub mod store;

pub use invariants::InvariantViolation;
pub use list::{MarkerList, OverlapRule};
pub use marker::{Marker, MarkerDetail, RenderedRects};
pub use store::{MarkerStore, RepaintHook};
