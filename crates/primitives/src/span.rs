use smallvec::SmallVec;

use crate::ids::NodeId;
use crate::range::{CharIdx, OffsetRange};

/// A document range covering one or more text nodes in document order.
///
/// `start_offset` applies to the first node and `end_offset` to the last one; nodes in
/// between are covered completely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpan {
	/// Covered nodes, first to last.
	pub nodes: SmallVec<[NodeId; 4]>,
	/// Offset into the first node.
	pub start_offset: CharIdx,
	/// Offset into the last node.
	pub end_offset: CharIdx,
}

impl NodeSpan {
	/// Creates a span inside a single node.
	pub fn single(node: NodeId, range: OffsetRange) -> Self {
		let mut nodes = SmallVec::new();
		nodes.push(node);
		Self {
			nodes,
			start_offset: range.start,
			end_offset: range.end,
		}
	}

	/// Creates a span over several nodes.
	pub fn new(nodes: impl IntoIterator<Item = NodeId>, start_offset: CharIdx, end_offset: CharIdx) -> Self {
		Self {
			nodes: nodes.into_iter().collect(),
			start_offset,
			end_offset,
		}
	}

	/// First covered node.
	pub fn first_node(&self) -> Option<NodeId> {
		self.nodes.first().copied()
	}

	/// Last covered node.
	pub fn last_node(&self) -> Option<NodeId> {
		self.nodes.last().copied()
	}

	/// Returns true if the span covers no nodes, or is a collapsed point.
	pub fn is_collapsed(&self) -> bool {
		self.nodes.is_empty() || (self.nodes.len() == 1 && self.start_offset >= self.end_offset)
	}

	/// Part of `node` covered by this span, given the node's text length.
	///
	/// Returns `None` when `node` is not part of the span.
	pub fn range_in(&self, node: NodeId, node_len: CharIdx) -> Option<OffsetRange> {
		let position = self.nodes.iter().position(|n| *n == node)?;
		let start = if position == 0 { self.start_offset } else { 0 };
		let end = if position + 1 == self.nodes.len() {
			self.end_offset
		} else {
			node_len
		};
		Some(OffsetRange::new(start.min(end), end))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_single_node_span() {
		let n = NodeId(1);
		let span = NodeSpan::single(n, OffsetRange::new(2, 6));
		assert_eq!(span.first_node(), Some(n));
		assert_eq!(span.last_node(), Some(n));
		assert_eq!(span.range_in(n, 100), Some(OffsetRange::new(2, 6)));
		assert!(!span.is_collapsed());
	}

	#[test]
	fn test_multi_node_span_ranges() {
		let (a, b, c) = (NodeId(1), NodeId(2), NodeId(3));
		let span = NodeSpan::new([a, b, c], 4, 3);
		assert_eq!(span.range_in(a, 10), Some(OffsetRange::new(4, 10)));
		assert_eq!(span.range_in(b, 7), Some(OffsetRange::new(0, 7)));
		assert_eq!(span.range_in(c, 9), Some(OffsetRange::new(0, 3)));
		assert_eq!(span.range_in(NodeId(4), 9), None);
	}

	#[test]
	fn test_collapsed() {
		assert!(NodeSpan::single(NodeId(1), OffsetRange::point(3)).is_collapsed());
		assert!(NodeSpan::new([], 0, 0).is_collapsed());
	}
}
