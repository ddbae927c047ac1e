use lectern_primitives::{CharIdx, CharLen, NodeId, OffsetRange};

use super::*;
use crate::backend::{CheckResult, GrammarCheck};
use crate::request::{CheckMode, CheckTypes, RequestScope};

/// Backend that keeps every reply for the test to fire.
#[derive(Default)]
struct HeldBackend {
	dispatched: Vec<SequenceNumber>,
	replies: Vec<CheckReply>,
}

impl HeldBackend {
	fn take_reply(&mut self, sequence: SequenceNumber) -> CheckReply {
		let idx = self
			.replies
			.iter()
			.position(|r| r.sequence() == sequence)
			.expect("reply for sequence");
		self.replies.remove(idx)
	}
}

impl CheckBackend for HeldBackend {
	fn check_spelling(&mut self, _text: &str) -> Option<(CharIdx, CharLen)> {
		None
	}

	fn check_grammar(&mut self, _text: &str) -> GrammarCheck {
		GrammarCheck::default()
	}

	fn auto_correct_suggestion(&mut self, _word: &str) -> Option<String> {
		None
	}

	fn request_async_check(&mut self, request: &Request, reply: CheckReply) {
		self.dispatched.push(request.sequence());
		self.replies.push(reply);
	}
}

/// Backend that answers inside `request_async_check`.
#[derive(Default)]
struct ImmediateBackend {
	dispatched: Vec<SequenceNumber>,
}

impl CheckBackend for ImmediateBackend {
	fn check_spelling(&mut self, _text: &str) -> Option<(CharIdx, CharLen)> {
		None
	}

	fn check_grammar(&mut self, _text: &str) -> GrammarCheck {
		GrammarCheck::default()
	}

	fn auto_correct_suggestion(&mut self, _word: &str) -> Option<String> {
		None
	}

	fn request_async_check(&mut self, request: &Request, reply: CheckReply) {
		self.dispatched.push(request.sequence());
		reply.succeed(vec![CheckResult::spelling(0, 1)]);
	}
}

fn request(root: u64, chain: u32) -> Request {
	Request::new(
		RequestScope {
			root: NodeId(root),
			node: NodeId(root),
			text_start: 0,
		},
		"text".into(),
		OffsetRange::new(0, 4),
		CheckTypes::SPELLING,
		CheckMode::Batch,
	)
	.with_chain(chain)
}

#[test]
fn test_idle_queue_dispatches_immediately() {
	let mut queue = RequestQueue::new();
	let mut backend = HeldBackend::default();

	let seq = queue.request_checking_for(request(1, 0), &mut backend);

	assert_eq!(backend.dispatched, vec![seq]);
	assert_eq!(queue.in_flight().map(Request::state), Some(RequestState::InFlight));
	assert_eq!(queue.pending_len(), 0);
}

#[test]
fn test_sequencing_continuation_and_other_root() {
	let mut queue = RequestQueue::new();
	let mut backend = HeldBackend::default();

	let r1 = queue.request_checking_for(request(1, 0), &mut backend);
	let r2 = queue.request_checking_for(request(1, 1), &mut backend);
	let r3 = queue.request_checking_for(request(2, 0), &mut backend);

	let pending: Vec<_> = queue.pending().map(Request::sequence).collect();
	assert_eq!(pending, vec![r2, r3]);
	assert!(queue.pending().all(|r| r.state() == RequestState::Queued));

	backend.take_reply(r1).succeed(Vec::new());
	let finished = queue.poll_completion().expect("r1 completes");
	assert_eq!(finished.request.sequence(), r1);
	assert_eq!(finished.request.state(), RequestState::Completed);
	assert_eq!(queue.last_processed_sequence(), r1);

	// The next dispatch waits for the deferred drain.
	assert!(queue.in_flight().is_none());
	assert!(queue.has_deferred());
	assert_eq!(backend.dispatched, vec![r1]);

	queue.run_deferred(&mut backend);
	assert_eq!(backend.dispatched, vec![r1, r2]);

	backend.take_reply(r2).succeed(Vec::new());
	assert!(queue.poll_completion().is_some());
	queue.run_deferred(&mut backend);
	assert_eq!(backend.dispatched, vec![r1, r2, r3]);
}

#[test]
fn test_same_root_request_replaces_queued_in_place() {
	let mut queue = RequestQueue::new();
	let mut backend = HeldBackend::default();

	queue.request_checking_for(request(1, 0), &mut backend);
	let stale = queue.request_checking_for(request(2, 0), &mut backend);
	let other = queue.request_checking_for(request(3, 0), &mut backend);
	let fresh = queue.request_checking_for(request(2, 0), &mut backend);

	let pending: Vec<_> = queue.pending().map(Request::sequence).collect();
	assert_eq!(pending, vec![fresh, other]);
	assert!(!pending.contains(&stale));
}

#[test]
fn test_mismatched_completion_discards_pending() {
	let mut queue = RequestQueue::new();
	let mut backend = HeldBackend::default();

	let r1 = queue.request_checking_for(request(1, 0), &mut backend);
	queue.request_checking_for(request(2, 0), &mut backend);
	queue.request_checking_for(request(3, 0), &mut backend);

	// A reply that claims a different sequence than the in-flight one.
	let tx = queue.tx.clone();
	let fired = Arc::new(AtomicBool::new(false));
	CheckReply::new(SequenceNumber(r1.0 + 40), fired, tx).succeed(Vec::new());

	assert!(queue.poll_completion().is_none());
	assert_eq!(queue.pending_len(), 0);
	assert_eq!(queue.in_flight().map(Request::sequence), Some(r1));
	assert!(!queue.has_deferred());
}

#[test]
fn test_cancel_completes_with_cancelled_outcome() {
	let mut queue = RequestQueue::new();
	let mut backend = HeldBackend::default();

	let r1 = queue.request_checking_for(request(1, 0), &mut backend);
	let r2 = queue.request_checking_for(request(2, 0), &mut backend);

	let finished = queue.cancel_check().expect("in-flight cancelled");
	assert_eq!(finished.request.sequence(), r1);
	assert_eq!(finished.outcome, CheckOutcome::Cancelled);
	assert_eq!(finished.request.state(), RequestState::Cancelled);
	assert_eq!(queue.last_processed_sequence(), r1);

	// The late reply is a silent no-op.
	let reply = backend.take_reply(r1);
	assert!(reply.is_detached());
	reply.succeed(vec![CheckResult::spelling(0, 2)]);
	assert!(queue.poll_completion().is_none());

	queue.run_deferred(&mut backend);
	assert_eq!(queue.in_flight().map(Request::sequence), Some(r2));
}

#[test]
fn test_cancel_after_reply_loses_to_reply() {
	let mut queue = RequestQueue::new();
	let mut backend = HeldBackend::default();

	let r1 = queue.request_checking_for(request(1, 0), &mut backend);
	backend.take_reply(r1).succeed(Vec::new());

	assert!(queue.cancel_check().is_none());
	let finished = queue.poll_completion().expect("reply delivered");
	assert_eq!(finished.outcome, CheckOutcome::Succeeded(Vec::new()));
}

#[test]
fn test_backend_cancel_reaches_queue() {
	let mut queue = RequestQueue::new();
	let mut backend = HeldBackend::default();

	let r1 = queue.request_checking_for(request(1, 0), &mut backend);
	backend.take_reply(r1).cancel();

	let finished = queue.poll_completion().expect("cancellation delivered");
	assert_eq!(finished.outcome, CheckOutcome::Cancelled);
	assert!(queue.is_idle());
}

#[test]
fn test_cancel_without_in_flight_is_none() {
	let mut queue = RequestQueue::new();
	assert!(queue.cancel_check().is_none());
}

#[test]
fn test_synchronous_backend_does_not_recurse() {
	let mut queue = RequestQueue::new();
	let mut backend = ImmediateBackend::default();

	let r1 = queue.request_checking_for(request(1, 0), &mut backend);
	// The reply is already queued, but the request stays in flight until polled.
	let r2 = queue.request_checking_for(request(2, 0), &mut backend);
	assert_eq!(backend.dispatched, vec![r1]);

	let mut completed = Vec::new();
	loop {
		while let Some(finished) = queue.poll_completion() {
			completed.push(finished.request.sequence());
		}
		if queue.run_deferred(&mut backend) == 0 {
			break;
		}
	}
	assert_eq!(completed, vec![r1, r2]);
	assert!(queue.is_idle());
}

#[test]
fn test_drop_detaches_in_flight_reply() {
	let mut backend = HeldBackend::default();
	let reply = {
		let mut queue = RequestQueue::new();
		let r1 = queue.request_checking_for(request(1, 0), &mut backend);
		backend.take_reply(r1)
	};
	assert!(reply.is_detached());
	reply.succeed(Vec::new());
}

#[test]
fn test_sequence_numbers_are_monotonic() {
	let mut queue = RequestQueue::new();
	let mut backend = HeldBackend::default();
	let a = queue.request_checking_for(request(1, 0), &mut backend);
	let b = queue.request_checking_for(request(2, 0), &mut backend);
	assert_eq!(a, SequenceNumber(0));
	assert_eq!(b, SequenceNumber(1));
	assert_eq!(queue.last_requested_sequence(), b);
}
