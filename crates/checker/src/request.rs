//! Check requests handed from the engine to the queue and on to the backend.

use std::fmt;

use lectern_primitives::{CharIdx, MarkerTypes, NodeId, OffsetRange};

/// Monotonic id matching an asynchronous reply to its request.
///
/// [`SequenceNumber::UNREQUESTED`] marks a request that was never submitted and is
/// skipped when the counter wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceNumber(pub u32);

impl SequenceNumber {
	/// Sentinel for requests that were never submitted.
	pub const UNREQUESTED: SequenceNumber = SequenceNumber(u32::MAX);

	/// The number following this one, skipping the sentinel.
	pub fn next(self) -> Self {
		let next = self.0.wrapping_add(1);
		if next == Self::UNREQUESTED.0 {
			SequenceNumber(0)
		} else {
			SequenceNumber(next)
		}
	}

	pub fn is_requested(self) -> bool {
		self != Self::UNREQUESTED
	}
}

impl fmt::Display for SequenceNumber {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_requested() {
			write!(f, "{}", self.0)
		} else {
			f.write_str("unrequested")
		}
	}
}

bitflags::bitflags! {
	/// Kinds of checking requested.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct CheckTypes: u8 {
		/// Spelling, including invisible spellcheck results.
		const SPELLING = 1 << 0;
		/// Grammar.
		const GRAMMAR = 1 << 1;
		/// Apply autocorrect suggestions to spelling results.
		const CORRECTION = 1 << 2;
	}
}

impl CheckTypes {
	/// Marker types produced by these check types.
	pub fn marker_types(self) -> MarkerTypes {
		let mut types = MarkerTypes::empty();
		if self.contains(CheckTypes::SPELLING) {
			types |= MarkerTypes::SPELLING | MarkerTypes::INVISIBLE_SPELLCHECK;
		}
		if self.contains(CheckTypes::GRAMMAR) {
			types |= MarkerTypes::GRAMMAR;
		}
		types
	}
}

/// Whether the request covers a whole paragraph or the span just edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
	Batch,
	Incremental,
}

/// Request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
	Unrequested,
	Queued,
	InFlight,
	Completed,
	Cancelled,
}

/// Where the request text lives in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestScope {
	/// Editable root, the coalescing key.
	pub root: NodeId,
	/// Text node the snapshot was taken from.
	pub node: NodeId,
	/// Node offset of the snapshot's first char.
	pub text_start: CharIdx,
}

/// A marker already present in the checked text, so the backend can skip unchanged
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorMarker {
	pub fingerprint: u32,
	/// Range relative to the request text.
	pub range: OffsetRange,
}

/// One check of a text snapshot.
#[derive(Debug, Clone)]
pub struct Request {
	scope: RequestScope,
	text: String,
	check_range: OffsetRange,
	types: CheckTypes,
	mode: CheckMode,
	prior_markers: Vec<PriorMarker>,
	pub(crate) sequence: SequenceNumber,
	chain: u32,
	pub(crate) state: RequestState,
}

impl Request {
	/// Creates an unrequested check of `check_range` within `text`.
	///
	/// Text outside `check_range` is context: it helps the backend but results there are
	/// discarded.
	pub fn new(scope: RequestScope, text: String, check_range: OffsetRange, types: CheckTypes, mode: CheckMode) -> Self {
		Self {
			scope,
			text,
			check_range,
			types,
			mode,
			prior_markers: Vec::new(),
			sequence: SequenceNumber::UNREQUESTED,
			chain: 0,
			state: RequestState::Unrequested,
		}
	}

	/// Sets the position within a multi-chunk paragraph check.
	pub fn with_chain(mut self, chain: u32) -> Self {
		self.chain = chain;
		self
	}

	pub fn with_prior_markers(mut self, prior: Vec<PriorMarker>) -> Self {
		self.prior_markers = prior;
		self
	}

	pub fn scope(&self) -> &RequestScope {
		&self.scope
	}

	pub fn root(&self) -> NodeId {
		self.scope.root
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn check_range(&self) -> OffsetRange {
		self.check_range
	}

	pub fn types(&self) -> CheckTypes {
		self.types
	}

	pub fn mode(&self) -> CheckMode {
		self.mode
	}

	pub fn prior_markers(&self) -> &[PriorMarker] {
		&self.prior_markers
	}

	pub fn sequence(&self) -> SequenceNumber {
		self.sequence
	}

	pub fn chain(&self) -> u32 {
		self.chain
	}

	pub fn state(&self) -> RequestState {
		self.state
	}

	/// Returns true if `self` continues the chunk chain of `prev`.
	pub(crate) fn continues(&self, prev: &Request) -> bool {
		self.scope.root == prev.scope.root && self.chain == prev.chain.wrapping_add(1)
	}
}
