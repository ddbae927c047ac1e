use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating unique node IDs.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier for a document text node.
///
/// Marker storage is keyed by this id rather than by a reference to the node. The owner of
/// the node lifecycle must tell the store when a node is destroyed; nothing is invalidated
/// implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl NodeId {
	/// Generates a new unique node ID.
	pub fn next() -> Self {
		Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_next_ids_are_distinct_and_increasing() {
		let a = NodeId::next();
		let b = NodeId::next();
		assert_ne!(a, b);
		assert!(b > a);
	}

	#[test]
	fn test_display() {
		assert_eq!(NodeId(7).to_string(), "#7");
	}
}
