//! Per-node marker storage.
//!
//! [`MarkerStore`] maps a [`NodeId`] to up to four [`MarkerList`]s, one per
//! [`MarkerType`]. Entries appear on the first [`MarkerStore::add_marker`] for a node; a
//! list is dropped as soon as it becomes empty and a node entry as soon as all its lists
//! are gone.
//!
//! # Summary mask
//!
//! The store keeps a [`MarkerTypes`] mask of types that *may* be present. Adding a
//! marker sets its type's bit; the mask is only reset when the whole store becomes
//! empty. Bulk operations consult it to skip scans entirely. It must always be a
//! superset of the types actually stored (see [`crate::invariants`]).
//!
//! # Node lifecycle
//!
//! Nodes are referenced by id only. The owner of the document tree must call
//! [`MarkerStore::node_removed`] when a node is destroyed.

mod edit;
mod query;
mod remove;

use std::fmt;

use lectern_primitives::{MarkerType, MarkerTypes, NodeId};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::list::MarkerList;
use crate::marker::Marker;

/// Callback fired with each node whose marker state changed.
pub type RepaintHook = Box<dyn FnMut(NodeId)>;

/// Marker lists for one node, indexed by [`MarkerType::index`].
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeMarkers {
	lists: [Option<MarkerList>; MarkerType::COUNT],
}

impl NodeMarkers {
	pub(crate) fn list(&self, ty: MarkerType) -> Option<&MarkerList> {
		self.lists[ty.index()].as_ref()
	}

	pub(crate) fn list_mut(&mut self, ty: MarkerType) -> Option<&mut MarkerList> {
		self.lists[ty.index()].as_mut()
	}

	fn list_or_insert(&mut self, ty: MarkerType) -> &mut MarkerList {
		self.lists[ty.index()].get_or_insert_with(|| MarkerList::new(ty))
	}

	pub(crate) fn lists(&self) -> impl Iterator<Item = &MarkerList> {
		self.lists.iter().flatten()
	}

	pub(crate) fn lists_mut(&mut self) -> impl Iterator<Item = &mut MarkerList> {
		self.lists.iter_mut().flatten()
	}

	/// Drops emptied lists. Returns true if no list remains.
	pub(crate) fn prune(&mut self) -> bool {
		for slot in &mut self.lists {
			if slot.as_ref().is_some_and(MarkerList::is_empty) {
				*slot = None;
			}
		}
		self.lists.iter().all(Option::is_none)
	}

	pub(crate) fn drop_lists(&mut self, types: MarkerTypes) -> bool {
		let mut dropped = false;
		for ty in types.iter_types() {
			dropped |= self.lists[ty.index()].take().is_some();
		}
		dropped
	}

	pub(crate) fn len(&self) -> usize {
		self.lists().map(MarkerList::len).sum()
	}
}

/// Owns every marker of a document, keyed by node.
#[derive(Default)]
pub struct MarkerStore {
	nodes: FxHashMap<NodeId, NodeMarkers>,
	possibly_present: MarkerTypes,
	repaint: Option<RepaintHook>,
}

impl fmt::Debug for MarkerStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MarkerStore")
			.field("nodes", &self.nodes)
			.field("possibly_present", &self.possibly_present)
			.finish()
	}
}

impl MarkerStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Installs the fire-and-forget repaint hook.
	pub fn set_repaint_hook(&mut self, hook: impl FnMut(NodeId) + 'static) {
		self.repaint = Some(Box::new(hook));
	}

	/// Types that may currently be stored.
	pub fn possibly_present(&self) -> MarkerTypes {
		self.possibly_present
	}

	/// Cheap check against the summary mask; may report types that are already gone.
	pub fn possibly_has_markers(&self, types: MarkerTypes) -> bool {
		self.possibly_present.intersects(types)
	}

	/// Total number of markers.
	pub fn len(&self) -> usize {
		self.nodes.values().map(NodeMarkers::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Number of nodes with at least one marker.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Adds a marker to `node`, merging it with overlapping markers of the same type unless
	/// it is a text match. Empty markers are ignored.
	pub fn add_marker(&mut self, node: NodeId, marker: Marker) {
		if marker.range().is_empty() {
			return;
		}
		debug_assert!(marker.end() >= marker.start());

		let ty = marker.marker_type();
		self.possibly_present |= MarkerTypes::from(ty);
		trace!(node = %node, ty = ?ty, start = marker.start(), end = marker.end(), "markers.add");

		self.nodes.entry(node).or_default().list_or_insert(ty).insert(marker);
		self.repaint_node(node);
		self.debug_validate();
	}

	/// Drops every marker of `node`. Call this when the node is destroyed.
	pub fn node_removed(&mut self, node: NodeId) {
		self.remove_markers_for_node(node, MarkerTypes::all());
	}

	pub(crate) fn node(&self, node: NodeId) -> Option<&NodeMarkers> {
		self.nodes.get(&node)
	}

	pub(crate) fn nodes(&self) -> &FxHashMap<NodeId, NodeMarkers> {
		&self.nodes
	}

	pub(crate) fn repaint_node(&mut self, node: NodeId) {
		if let Some(hook) = self.repaint.as_mut() {
			hook(node);
		}
	}

	/// Prunes empty lists of `node`, drops its entry once empty, and resets the summary
	/// mask when the store is empty.
	pub(crate) fn prune_node(&mut self, node: NodeId) {
		if let Some(entry) = self.nodes.get_mut(&node)
			&& entry.prune()
		{
			self.nodes.remove(&node);
		}
		self.reset_mask_if_empty();
	}

	pub(crate) fn reset_mask_if_empty(&mut self) {
		if self.nodes.is_empty() {
			self.possibly_present = MarkerTypes::empty();
		}
	}

	#[cfg(test)]
	pub(crate) fn debug_validate(&self) {
		if let Err(violation) = self.validate() {
			panic!("marker store invariant violated: {violation}");
		}
	}

	#[cfg(not(test))]
	#[inline]
	pub(crate) fn debug_validate(&self) {
		debug_assert!(!self.nodes.is_empty() || self.possibly_present.is_empty());
	}
}
