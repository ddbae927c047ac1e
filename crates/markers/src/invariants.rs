//! Full-scan consistency checks for [`MarkerStore`].
//!
//! See [`catalog`] for the invariants and where they are enforced. The store runs
//! [`MarkerStore::validate`] after every mutation in test builds.

pub mod catalog;

use lectern_primitives::{MarkerType, MarkerTypes, NodeId, OffsetRange};

use crate::store::MarkerStore;

/// A broken store invariant, reported by [`MarkerStore::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
	/// A stored marker covers no characters.
	#[error("empty marker {range:?} of type {ty:?} on node {node}")]
	EmptyMarker {
		node: NodeId,
		ty: MarkerType,
		range: OffsetRange,
	},
	/// A marker sits in the list of another type.
	#[error("marker of type {found:?} stored in the {list:?} list of node {node}")]
	WrongList {
		node: NodeId,
		list: MarkerType,
		found: MarkerType,
	},
	/// A list is not sorted by start.
	#[error("{ty:?} list of node {node} is out of order at {at:?}")]
	Unsorted {
		node: NodeId,
		ty: MarkerType,
		at: OffsetRange,
	},
	/// Two markers of a merging type overlap or abut.
	#[error("{ty:?} markers {first:?} and {second:?} on node {node} were not merged")]
	Unmerged {
		node: NodeId,
		ty: MarkerType,
		first: OffsetRange,
		second: OffsetRange,
	},
	/// An empty list or node entry was retained.
	#[error("empty entry retained for node {node}")]
	EmptyEntry { node: NodeId },
	/// A stored type is missing from the summary mask.
	#[error("summary mask {mask:?} does not admit stored {ty:?} markers")]
	MaskMissingType { mask: MarkerTypes, ty: MarkerType },
	/// The store is empty but the summary mask is not.
	#[error("summary mask {mask:?} not reset on an empty store")]
	MaskNotReset { mask: MarkerTypes },
}

impl MarkerStore {
	/// Checks every store invariant with a full scan.
	pub fn validate(&self) -> Result<(), InvariantViolation> {
		let mask = self.possibly_present();
		if self.is_empty() && !mask.is_empty() {
			return Err(InvariantViolation::MaskNotReset { mask });
		}

		let mut nodes: Vec<_> = self.nodes().iter().collect();
		nodes.sort_unstable_by_key(|(node, _)| **node);

		for (&node, entry) in nodes {
			let mut any = false;
			for ty in MarkerType::ALL {
				let Some(list) = entry.list(ty) else {
					continue;
				};
				if list.is_empty() {
					return Err(InvariantViolation::EmptyEntry { node });
				}
				any = true;
				if !mask.has(ty) {
					return Err(InvariantViolation::MaskMissingType { mask, ty });
				}

				let mut prev: Option<OffsetRange> = None;
				for marker in list.iter() {
					let range = marker.range();
					if marker.marker_type() != ty {
						return Err(InvariantViolation::WrongList {
							node,
							list: ty,
							found: marker.marker_type(),
						});
					}
					if range.is_empty() {
						return Err(InvariantViolation::EmptyMarker { node, ty, range });
					}
					if let Some(prev) = prev {
						if range.start < prev.start {
							return Err(InvariantViolation::Unsorted { node, ty, at: range });
						}
						if ty.merges_overlaps() && range.start <= prev.end {
							return Err(InvariantViolation::Unmerged {
								node,
								ty,
								first: prev,
								second: range,
							});
						}
					}
					prev = Some(range);
				}
			}
			if !any {
				return Err(InvariantViolation::EmptyEntry { node });
			}
		}
		Ok(())
	}
}
