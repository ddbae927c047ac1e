//! Contract with the external checking backend and its result schema.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lectern_primitives::{CharIdx, CharLen, MarkerType, OffsetRange};
use tokio::sync::mpsc;
use tracing::trace;

use crate::request::{Request, SequenceNumber};

/// How a backend result should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
	Spelling,
	Grammar,
	InvisibleSpellcheck,
}

impl Decoration {
	/// Marker type a result with this decoration produces.
	pub fn marker_type(self) -> MarkerType {
		match self {
			Decoration::Spelling => MarkerType::Spelling,
			Decoration::Grammar => MarkerType::Grammar,
			Decoration::InvisibleSpellcheck => MarkerType::InvisibleSpellcheck,
		}
	}
}

/// One grammar problem inside a grammar result.
///
/// `location` is relative to the owning result's location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarDetail {
	pub location: CharIdx,
	pub length: CharLen,
	pub guesses: Vec<String>,
	pub description: String,
}

/// One finding reported by the backend, anchored to the request text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
	pub decoration: Decoration,
	pub location: CharIdx,
	pub length: CharLen,
	/// Suggested replacement, stored as the marker description.
	pub replacement: String,
	/// Backend content hash, echoed back in later requests.
	pub fingerprint: u32,
	pub details: Vec<GrammarDetail>,
}

impl CheckResult {
	/// A spelling result without suggestion.
	pub fn spelling(location: CharIdx, length: CharLen) -> Self {
		Self {
			decoration: Decoration::Spelling,
			location,
			length,
			replacement: String::new(),
			fingerprint: 0,
			details: Vec::new(),
		}
	}

	/// A grammar result carrying per-problem details.
	pub fn grammar(location: CharIdx, length: CharLen, details: Vec<GrammarDetail>) -> Self {
		Self {
			decoration: Decoration::Grammar,
			location,
			length,
			replacement: String::new(),
			fingerprint: 0,
			details,
		}
	}

	pub fn with_decoration(mut self, decoration: Decoration) -> Self {
		self.decoration = decoration;
		self
	}

	pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
		self.replacement = replacement.into();
		self
	}

	pub fn with_fingerprint(mut self, fingerprint: u32) -> Self {
		self.fingerprint = fingerprint;
		self
	}

	/// Range of the result within the request text, or `None` if it overflows.
	pub fn range(&self) -> Option<OffsetRange> {
		OffsetRange::checked_with_len(self.location, self.length)
	}
}

/// Outcome of a synchronous grammar check.
///
/// `bad_span` is the first problematic span of the text; detail locations are relative
/// to its start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarCheck {
	pub details: Vec<GrammarDetail>,
	pub bad_span: Option<OffsetRange>,
}

/// How an asynchronous check ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
	Succeeded(Vec<CheckResult>),
	Cancelled,
}

/// Reply routed from a [`CheckReply`] back to the owning queue.
#[derive(Debug)]
pub(crate) struct Completion {
	pub(crate) sequence: SequenceNumber,
	pub(crate) outcome: CheckOutcome,
}

/// Single-fire handle through which the backend answers one asynchronous request.
///
/// Exactly one of [`CheckReply::succeed`] or [`CheckReply::cancel`] can take effect, and
/// only once. Replies for a request that was cancelled, or whose queue was dropped, are
/// silently discarded.
#[derive(Debug)]
pub struct CheckReply {
	sequence: SequenceNumber,
	fired: Arc<AtomicBool>,
	tx: mpsc::UnboundedSender<Completion>,
}

impl CheckReply {
	pub(crate) fn new(sequence: SequenceNumber, fired: Arc<AtomicBool>, tx: mpsc::UnboundedSender<Completion>) -> Self {
		Self { sequence, fired, tx }
	}

	/// Sequence number of the request this reply answers.
	pub fn sequence(&self) -> SequenceNumber {
		self.sequence
	}

	/// Returns true if nothing will observe this reply anymore.
	pub fn is_detached(&self) -> bool {
		self.fired.load(Ordering::Acquire) || self.tx.is_closed()
	}

	/// Delivers results for the request.
	pub fn succeed(self, results: Vec<CheckResult>) {
		self.fire(CheckOutcome::Succeeded(results));
	}

	/// Reports that the backend gave up on the request.
	pub fn cancel(self) {
		self.fire(CheckOutcome::Cancelled);
	}

	fn fire(self, outcome: CheckOutcome) {
		if self.fired.swap(true, Ordering::AcqRel) {
			trace!(seq = %self.sequence, "check.reply.detached");
			return;
		}
		let completion = Completion {
			sequence: self.sequence,
			outcome,
		};
		if self.tx.send(completion).is_err() {
			trace!(seq = %self.sequence, "check.reply.owner_gone");
		}
	}
}

/// The external spelling and grammar engine.
///
/// Offsets are char offsets into the text passed in. Implementations of
/// [`CheckBackend::request_async_check`] must eventually fire the reply exactly once;
/// a reply that is never fired stalls every later check.
pub trait CheckBackend {
	/// First misspelled word in `text`, as `(location, length)`.
	fn check_spelling(&mut self, text: &str) -> Option<(CharIdx, CharLen)>;

	/// First grammar problem in `text`.
	fn check_grammar(&mut self, text: &str) -> GrammarCheck;

	/// Replacement to apply automatically for a misspelled `word`.
	fn auto_correct_suggestion(&mut self, word: &str) -> Option<String>;

	/// Starts an asynchronous check of `request`, answered through `reply`.
	fn request_async_check(&mut self, request: &Request, reply: CheckReply);
}
