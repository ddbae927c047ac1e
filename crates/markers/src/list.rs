//! Sorted marker list for a single `(node, type)` pair.
//!
//! Lists are ordered by `start`. Lists of merging types additionally never hold two
//! overlapping markers, which also makes their `end` offsets monotonic; the binary
//! searches below rely on that. [`MarkerType::TextMatch`] lists only guarantee the
//! `start` order.

use lectern_primitives::{CharIdx, Delta, MarkerType, OffsetRange};
use smallvec::SmallVec;

use crate::marker::Marker;

/// How removal treats markers that only partly overlap the removed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapRule {
	/// Keep the parts of a marker outside the removed range.
	#[default]
	KeepResidue,
	/// Remove any touched marker entirely, however small the overlap.
	RemoveWhole,
}

/// Markers of one type attached to one node.
#[derive(Debug, Clone)]
pub struct MarkerList {
	ty: MarkerType,
	markers: Vec<Marker>,
}

impl MarkerList {
	pub(crate) fn new(ty: MarkerType) -> Self {
		Self {
			ty,
			markers: Vec::new(),
		}
	}

	pub fn marker_type(&self) -> MarkerType {
		self.ty
	}

	pub fn len(&self) -> usize {
		self.markers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.markers.is_empty()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
		self.markers.iter()
	}

	pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Marker> {
		self.markers.iter_mut()
	}

	pub fn as_slice(&self) -> &[Marker] {
		&self.markers
	}

	/// Inserts a non-empty marker, merging with overlapping or adjacent markers for
	/// merging types.
	pub(crate) fn insert(&mut self, marker: Marker) {
		debug_assert_eq!(marker.marker_type(), self.ty);
		debug_assert!(!marker.range().is_empty());

		match self.markers.last() {
			None => {
				self.markers.push(marker);
				return;
			}
			Some(last) if marker.start() > last.end() => {
				self.markers.push(marker);
				return;
			}
			Some(_) => {}
		}

		if !self.ty.merges_overlaps() {
			let at = self.markers.partition_point(|m| m.start() <= marker.start());
			self.markers.insert(at, marker);
			return;
		}

		// First marker that could touch the new one.
		let at = self.markers.partition_point(|m| m.end() < marker.start());
		self.markers.insert(at, marker);

		let next = at + 1;
		while next < self.markers.len() && self.markers[next].start() <= self.markers[at].end() {
			let absorbed = self.markers.remove(next);
			self.markers[at].absorb(&absorbed.range());
		}
	}

	/// Index of the first marker that may overlap a range starting at `offset`.
	fn scan_start(&self, offset: CharIdx) -> usize {
		if self.ty.merges_overlaps() {
			self.markers.partition_point(|m| m.end() <= offset)
		} else {
			0
		}
	}

	/// Removes markers overlapping `target`. Returns true if anything was removed.
	pub(crate) fn remove_overlapping(&mut self, target: OffsetRange, rule: OverlapRule) -> bool {
		let mut residue: SmallVec<[Marker; 2]> = SmallVec::new();
		let mut removed = false;
		let mut i = self.scan_start(target.start);

		while i < self.markers.len() {
			let marker = &self.markers[i];
			if marker.start() >= target.end {
				break;
			}
			if marker.end() <= target.start {
				i += 1;
				continue;
			}

			let marker = self.markers.remove(i);
			removed = true;
			if rule == OverlapRule::KeepResidue {
				if marker.start() < target.start {
					residue.push(marker.with_range(OffsetRange::new(marker.start(), target.start)));
				}
				if marker.end() > target.end {
					residue.push(marker.with_range(OffsetRange::new(target.end, marker.end())));
				}
			}
		}

		for marker in residue {
			self.insert(marker);
		}
		removed
	}

	/// Removes every marker for which `remove` returns true.
	pub(crate) fn remove_where(&mut self, mut remove: impl FnMut(&Marker) -> bool) -> bool {
		let before = self.markers.len();
		self.markers.retain(|m| !remove(m));
		self.markers.len() != before
	}

	/// Shifts markers starting at or after `offset`. Returns the number shifted.
	pub(crate) fn shift_from(&mut self, offset: CharIdx, delta: Delta) -> usize {
		let first = self.markers.partition_point(|m| m.start() < offset);
		for marker in &mut self.markers[first..] {
			marker.shift_offsets(delta);
			marker.invalidate_rendered_rects();
		}
		self.markers.len() - first
	}

	/// Markers overlapping `target`, in list order.
	pub(crate) fn overlapping(&self, target: OffsetRange) -> impl Iterator<Item = &Marker> {
		let first = self.scan_start(target.start);
		self.markers[first..]
			.iter()
			.take_while(move |m| m.start() < target.end)
			.filter(move |m| m.end() > target.start)
	}

	/// Mutable variant of [`MarkerList::overlapping`].
	pub(crate) fn overlapping_mut(&mut self, target: OffsetRange) -> impl Iterator<Item = &mut Marker> {
		let first = self.scan_start(target.start);
		self.markers[first..]
			.iter_mut()
			.take_while(move |m| m.start() < target.end)
			.filter(move |m| m.end() > target.start)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn ranges(list: &MarkerList) -> Vec<(usize, usize)> {
		list.iter().map(|m| (m.start(), m.end())).collect()
	}

	fn spelling(list: &mut MarkerList, start: usize, end: usize) {
		list.insert(Marker::new(MarkerType::Spelling, start..end));
	}

	#[test]
	fn test_append_fast_path() {
		let mut list = MarkerList::new(MarkerType::Spelling);
		spelling(&mut list, 0, 3);
		spelling(&mut list, 5, 8);
		spelling(&mut list, 9, 12);
		assert_eq!(ranges(&list), vec![(0, 3), (5, 8), (9, 12)]);
	}

	#[test]
	fn test_insert_before_keeps_order() {
		let mut list = MarkerList::new(MarkerType::Spelling);
		spelling(&mut list, 10, 12);
		spelling(&mut list, 2, 4);
		assert_eq!(ranges(&list), vec![(2, 4), (10, 12)]);
	}

	#[test]
	fn test_merge_overlapping() {
		let mut list = MarkerList::new(MarkerType::Spelling);
		spelling(&mut list, 5, 10);
		spelling(&mut list, 8, 12);
		assert_eq!(ranges(&list), vec![(5, 12)]);
	}

	#[test]
	fn test_merge_adjacent() {
		let mut list = MarkerList::new(MarkerType::Grammar);
		list.insert(Marker::new(MarkerType::Grammar, 0..5));
		list.insert(Marker::new(MarkerType::Grammar, 5..8));
		list.insert(Marker::new(MarkerType::Grammar, 10..12));
		list.insert(Marker::new(MarkerType::Grammar, 3..4));
		assert_eq!(ranges(&list), vec![(0, 8), (10, 12)]);
	}

	#[test]
	fn test_merge_absorbs_many() {
		let mut list = MarkerList::new(MarkerType::Spelling);
		spelling(&mut list, 0, 2);
		spelling(&mut list, 4, 6);
		spelling(&mut list, 8, 10);
		spelling(&mut list, 20, 22);
		spelling(&mut list, 1, 9);
		assert_eq!(ranges(&list), vec![(0, 10), (20, 22)]);
	}

	#[test]
	fn test_merge_keeps_inserted_detail() {
		let mut list = MarkerList::new(MarkerType::Grammar);
		list.insert(Marker::new(MarkerType::Grammar, 0..4).with_description("old"));
		list.insert(Marker::new(MarkerType::Grammar, 2..6).with_description("new"));
		assert_eq!(list.as_slice()[0].description(), "new");
		assert_eq!(list.as_slice()[0].range(), OffsetRange::new(0, 6));
	}

	#[test]
	fn test_text_match_overlap_allowed() {
		let mut list = MarkerList::new(MarkerType::TextMatch);
		list.insert(Marker::text_match(0..3, false));
		list.insert(Marker::text_match(1..4, false));
		list.insert(Marker::text_match(0..1, false));
		assert_eq!(ranges(&list), vec![(0, 3), (0, 1), (1, 4)]);
	}

	#[test]
	fn test_remove_keep_residue() {
		let mut list = MarkerList::new(MarkerType::Spelling);
		list.insert(Marker::new(MarkerType::Spelling, 5..12).with_fingerprint(9));
		assert!(list.remove_overlapping(OffsetRange::new(6, 8), OverlapRule::KeepResidue));
		assert_eq!(ranges(&list), vec![(5, 6), (8, 12)]);
		assert!(list.iter().all(|m| m.fingerprint() == 9));
	}

	#[test]
	fn test_remove_whole_on_any_overlap() {
		let mut list = MarkerList::new(MarkerType::Spelling);
		spelling(&mut list, 5, 12);
		assert!(list.remove_overlapping(OffsetRange::new(11, 20), OverlapRule::RemoveWhole));
		assert!(list.is_empty());
	}

	#[test]
	fn test_remove_misses_adjacent() {
		let mut list = MarkerList::new(MarkerType::Spelling);
		spelling(&mut list, 0, 5);
		spelling(&mut list, 10, 15);
		assert!(!list.remove_overlapping(OffsetRange::new(5, 10), OverlapRule::RemoveWhole));
		assert_eq!(list.len(), 2);
	}

	#[test]
	fn test_remove_text_match_scans_from_head() {
		let mut list = MarkerList::new(MarkerType::TextMatch);
		list.insert(Marker::text_match(0..20, false));
		list.insert(Marker::text_match(2..3, false));
		list.insert(Marker::text_match(15..16, false));
		assert!(list.remove_overlapping(OffsetRange::new(10, 12), OverlapRule::RemoveWhole));
		assert_eq!(ranges(&list), vec![(2, 3), (15, 16)]);
	}

	#[test]
	fn test_shift_from_boundary() {
		let mut list = MarkerList::new(MarkerType::Spelling);
		spelling(&mut list, 0, 3);
		spelling(&mut list, 5, 12);
		spelling(&mut list, 20, 22);
		assert_eq!(list.shift_from(5, 2), 2);
		assert_eq!(ranges(&list), vec![(0, 3), (7, 14), (22, 24)]);
	}

	#[test]
	fn test_overlapping_query() {
		let mut list = MarkerList::new(MarkerType::Spelling);
		spelling(&mut list, 0, 3);
		spelling(&mut list, 5, 8);
		spelling(&mut list, 10, 12);
		let hits: Vec<_> = list
			.overlapping(OffsetRange::new(3, 11))
			.map(|m| (m.start(), m.end()))
			.collect();
		assert_eq!(hits, vec![(5, 8), (10, 12)]);
	}
}
