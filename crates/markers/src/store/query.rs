use lectern_primitives::{CharIdx, MarkerTypes, NodeId, NodeSpan};

use super::{MarkerStore, NodeMarkers};
use crate::marker::Marker;

/// Markers of `types` on one node, merged across type lists in `start` order.
fn collect_sorted(entry: &NodeMarkers, types: MarkerTypes) -> Vec<&Marker> {
	let mut out: Vec<&Marker> = types
		.iter_types()
		.filter_map(|ty| entry.list(ty))
		.flat_map(|list| list.iter())
		.collect();
	// Stable, so equal starts keep type order and text-match insertion order.
	out.sort_by_key(|m| m.start());
	out
}

impl MarkerStore {
	/// Markers of `types` on `node`, sorted by start.
	pub fn markers_for(&self, node: NodeId, types: MarkerTypes) -> Vec<&Marker> {
		if !self.possibly_has_markers(types) {
			return Vec::new();
		}
		self.node(node)
			.map(|entry| collect_sorted(entry, types))
			.unwrap_or_default()
	}

	/// Every marker of `types`, ordered by node id and then by start.
	pub fn markers(&self, types: MarkerTypes) -> Vec<(NodeId, &Marker)> {
		if !self.possibly_has_markers(types) {
			return Vec::new();
		}
		let mut nodes: Vec<_> = self.nodes().keys().copied().collect();
		nodes.sort_unstable();
		nodes
			.into_iter()
			.flat_map(|node| self.markers_for(node, types).into_iter().map(move |m| (node, m)))
			.collect()
	}

	/// Markers of `types` intersecting `span`, in span node order and then start order.
	///
	/// Markers on the first node that end at or before the span start, and markers on the
	/// last node that start at or after the span end, are excluded.
	pub fn markers_in_span(&self, span: &NodeSpan, types: MarkerTypes) -> Vec<(NodeId, &Marker)> {
		if !self.possibly_has_markers(types) {
			return Vec::new();
		}
		let (Some(first), Some(last)) = (span.first_node(), span.last_node()) else {
			return Vec::new();
		};

		let mut out = Vec::new();
		for &node in &span.nodes {
			for marker in self.markers_for(node, types) {
				if node == first && marker.end() <= span.start_offset {
					continue;
				}
				if node == last && marker.start() >= span.end_offset {
					continue;
				}
				out.push((node, marker));
			}
		}
		out
	}

	/// Returns true if any marker of `types` intersects `span`.
	pub fn has_markers_in_span(&self, span: &NodeSpan, types: MarkerTypes) -> bool {
		!self.markers_in_span(span, types).is_empty()
	}

	/// Returns true if any marker of `types` is stored, confirming the summary mask with a
	/// scan.
	pub fn has_markers(&self, types: MarkerTypes) -> bool {
		self.possibly_has_markers(types)
			&& self.nodes().values().any(|entry| {
				types
					.iter_types()
					.any(|ty| entry.list(ty).is_some_and(|list| !list.is_empty()))
			})
	}

	/// First marker of `types` on `node` starting at or after `offset`.
	///
	/// Used to walk forward through misspellings.
	pub fn next_marker_after(&self, node: NodeId, offset: CharIdx, types: MarkerTypes) -> Option<&Marker> {
		self.markers_for(node, types)
			.into_iter()
			.find(|m| m.start() >= offset)
	}

	/// First marker of `types` on `node` covering `offset`.
	pub fn marker_at(&self, node: NodeId, offset: CharIdx, types: MarkerTypes) -> Option<&Marker> {
		self.markers_for(node, types)
			.into_iter()
			.find(|m| m.range().contains(offset))
	}
}
