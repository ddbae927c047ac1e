use lectern_primitives::{CharIdx, CharLen, MarkerTypes, NodeId, OffsetRange, Rope};
use tracing::debug;

use super::MarkerStore;
use crate::list::OverlapRule;
use crate::marker::Marker;

impl MarkerStore {
	/// Removes markers of `types` on `node` that overlap `[start, start + len)`.
	///
	/// The range end saturates, so `len = usize::MAX` clears to the end of the node.
	///
	/// With [`OverlapRule::KeepResidue`] the parts of a touched marker outside the range
	/// survive as new markers carrying the original detail and fingerprint. With
	/// [`OverlapRule::RemoveWhole`] any overlap removes the marker outright.
	pub fn remove_markers_in_range(
		&mut self,
		node: NodeId,
		start: CharIdx,
		len: CharLen,
		types: MarkerTypes,
		rule: OverlapRule,
	) {
		if len == 0 || !self.possibly_has_markers(types) {
			return;
		}
		let Some(entry) = self.nodes.get_mut(&node) else {
			return;
		};

		let target = OffsetRange::with_len(start, len);
		let mut changed = false;
		for ty in types.iter_types() {
			if let Some(list) = entry.list_mut(ty) {
				changed |= list.remove_overlapping(target, rule);
			}
		}

		self.prune_node(node);
		if changed {
			self.repaint_node(node);
		}
		self.debug_validate();
	}

	/// Removes all markers of `types` from `node`.
	pub fn remove_markers_for_node(&mut self, node: NodeId, types: MarkerTypes) {
		if !self.possibly_has_markers(types) {
			return;
		}

		let changed = if types.contains(MarkerTypes::all()) {
			self.nodes.remove(&node).is_some()
		} else {
			let Some(entry) = self.nodes.get_mut(&node) else {
				return;
			};
			let dropped = entry.drop_lists(types);
			self.prune_node(node);
			dropped
		};

		self.reset_mask_if_empty();
		if changed {
			debug!(node = %node, ?types, "markers.remove_node");
			self.repaint_node(node);
		}
		self.debug_validate();
	}

	/// Removes all markers of `types` from every node.
	///
	/// Once the summary mask no longer admits any of `types`, this is a no-op.
	pub fn remove_markers(&mut self, types: MarkerTypes) {
		if !self.possibly_has_markers(types) {
			return;
		}
		debug_assert!(!self.nodes.is_empty());

		let touched: Vec<NodeId> = if types.contains(MarkerTypes::all()) {
			self.nodes.drain().map(|(node, _)| node).collect()
		} else {
			let mut touched = Vec::new();
			self.nodes.retain(|node, entry| {
				if entry.drop_lists(types) {
					touched.push(*node);
				}
				!entry.prune()
			});
			touched
		};

		self.reset_mask_if_empty();
		debug!(?types, nodes = touched.len(), "markers.remove_all");
		for node in touched {
			self.repaint_node(node);
		}
		self.debug_validate();
	}

	/// Removes markers of `types` for which `remove` returns true.
	///
	/// `remove` receives each marker together with the text it covers, read through
	/// `text_of`. Markers on nodes whose text is unavailable are kept.
	pub fn remove_markers_matching(
		&mut self,
		types: MarkerTypes,
		text_of: impl Fn(NodeId) -> Option<Rope>,
		mut remove: impl FnMut(&Marker, &str) -> bool,
	) {
		if !self.possibly_has_markers(types) {
			return;
		}

		let mut touched = Vec::new();
		self.nodes.retain(|node, entry| {
			let Some(text) = text_of(*node) else {
				return true;
			};
			let len = text.len_chars();
			let mut changed = false;
			for ty in types.iter_types() {
				if let Some(list) = entry.list_mut(ty) {
					changed |= list.remove_where(|marker| {
						let range = marker.range().clamp(len);
						let covered = text.slice(range.start..range.end).to_string();
						remove(marker, &covered)
					});
				}
			}
			if changed {
				touched.push(*node);
			}
			!entry.prune()
		});

		self.reset_mask_if_empty();
		if !touched.is_empty() {
			debug!(?types, nodes = touched.len(), "markers.remove_matching");
		}
		for node in touched {
			self.repaint_node(node);
		}
		self.debug_validate();
	}
}
