use lectern_primitives::{CharIdx, CharLen, Delta, MarkerType, MarkerTypes, NodeId, OffsetRange, Rect};
use smallvec::SmallVec;
use tracing::trace;

use super::MarkerStore;
use crate::marker::Marker;

impl MarkerStore {
	/// Shifts every marker on `node` that starts at or after `start` by `delta`.
	///
	/// A marker that starts before `start` is left alone even if it extends past it.
	pub fn shift_markers(&mut self, node: NodeId, start: CharIdx, delta: Delta) {
		if delta == 0 {
			return;
		}
		let Some(entry) = self.nodes.get_mut(&node) else {
			return;
		};

		let shifted: usize = entry.lists_mut().map(|list| list.shift_from(start, delta)).sum();
		if shifted > 0 {
			trace!(node = %node, start, delta, shifted, "markers.shift");
			self.repaint_node(node);
		}
		self.debug_validate();
	}

	/// Copies markers of `src` overlapping `[start, start + len)` onto `dst`.
	///
	/// Each copy is clipped to the range, moved by `delta`, and added through
	/// [`MarkerStore::add_marker`] so the destination's merge rules apply.
	pub fn copy_markers(&mut self, src: NodeId, start: CharIdx, len: CharLen, dst: NodeId, delta: Delta) {
		if len == 0 {
			return;
		}
		let Some(entry) = self.node(src) else {
			return;
		};

		let target = OffsetRange::with_len(start, len);
		let copies: Vec<Marker> = entry
			.lists()
			.flat_map(|list| list.overlapping(target))
			.filter_map(|marker| {
				let clipped = marker.range().intersection(&target)?;
				Some(marker.with_range(clipped.shift(delta)))
			})
			.collect();

		for marker in copies {
			self.add_marker(dst, marker);
		}
	}

	/// Sets the active flag of text-match markers on `node` overlapping `range`.
	///
	/// Returns true if any marker was touched.
	pub fn set_markers_active(&mut self, node: NodeId, range: OffsetRange, active: bool) -> bool {
		let Some(list) = self
			.nodes
			.get_mut(&node)
			.and_then(|entry| entry.list_mut(MarkerType::TextMatch))
		else {
			return false;
		};

		let mut touched = false;
		for marker in list.overlapping_mut(range) {
			marker.set_active_match(active);
			touched = true;
		}
		if touched {
			self.repaint_node(node);
		}
		touched
	}

	/// Drops descriptions from markers of `types` on `node` overlapping `range`.
	pub fn clear_descriptions_in_range(&mut self, node: NodeId, range: OffsetRange, types: MarkerTypes) {
		let Some(entry) = self.nodes.get_mut(&node) else {
			return;
		};

		let mut cleared = false;
		for ty in types.iter_types() {
			if let Some(list) = entry.list_mut(ty) {
				for marker in list.overlapping_mut(range) {
					cleared |= marker.clear_description();
				}
			}
		}
		if cleared {
			self.repaint_node(node);
		}
	}

	/// Invalidates the rendered-rect cache of every marker on `node`.
	pub fn invalidate_rendered_rects(&mut self, node: NodeId) {
		if let Some(entry) = self.nodes.get_mut(&node) {
			entry
				.lists_mut()
				.flat_map(|list| list.iter_mut())
				.for_each(Marker::invalidate_rendered_rects);
		}
	}

	/// Invalidates every rendered-rect cache, e.g. after a relayout.
	pub fn invalidate_all_rendered_rects(&mut self) {
		self.nodes
			.values_mut()
			.flat_map(|entry| entry.lists_mut())
			.flat_map(|list| list.iter_mut())
			.for_each(Marker::invalidate_rendered_rects);
	}

	/// Fills invalid rendered-rect caches on `node` using `compute`.
	///
	/// Returns the number of markers whose cache was recomputed.
	pub fn update_rendered_rects(
		&mut self,
		node: NodeId,
		mut compute: impl FnMut(&Marker) -> SmallVec<[Rect; 1]>,
	) -> usize {
		let Some(entry) = self.nodes.get_mut(&node) else {
			return 0;
		};

		let mut updated = 0;
		for marker in entry.lists_mut().flat_map(|list| list.iter_mut()) {
			if !marker.rendered_rects().is_valid() {
				let rects = compute(marker);
				marker.set_rendered_rects(rects);
				updated += 1;
			}
		}
		updated
	}
}
