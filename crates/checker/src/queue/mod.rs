//! Single-flight request queue.
//!
//! # Design
//!
//! At most one request is in flight with the backend. New requests arriving while one
//! is in flight wait in a FIFO pending queue, coalesced per editable root:
//!
//! - a request that continues the chunk chain of the queue tail is appended;
//! - otherwise a queued request for the same root is replaced in place;
//! - otherwise the request is appended.
//!
//! Backend replies travel through a [`CheckReply`] over an unbounded channel and are
//! drained by [`RequestQueue::poll_completion`]. A reply whose sequence number does
//! not match the in-flight request means the document moved on without us, so the
//! whole pending queue is discarded. The next dispatch is never issued from inside
//! completion handling; it is scheduled on the [`Scheduler`] and issued by
//! [`RequestQueue::run_deferred`].
//!
//! # Teardown
//!
//! Dropping the queue marks the in-flight reply as fired, so a late backend reply is a
//! silent no-op.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::backend::{CheckBackend, CheckOutcome, CheckReply, Completion};
use crate::request::{Request, RequestState, SequenceNumber};
use crate::scheduler::{DeferredTask, Scheduler};

#[cfg(test)]
mod tests;

/// A request handed to the backend, with the fired flag shared with its reply.
#[derive(Debug)]
struct InFlight {
	request: Request,
	fired: Arc<AtomicBool>,
}

/// A request whose lifecycle ended, ready for result application.
#[derive(Debug)]
pub struct FinishedCheck {
	pub request: Request,
	pub outcome: CheckOutcome,
}

/// Single-flight queue between the engine and the backend.
#[derive(Debug)]
pub struct RequestQueue {
	in_flight: Option<InFlight>,
	pending: VecDeque<Request>,
	scheduler: Scheduler,
	last_requested: SequenceNumber,
	last_processed: SequenceNumber,
	tx: mpsc::UnboundedSender<Completion>,
	rx: mpsc::UnboundedReceiver<Completion>,
}

impl Default for RequestQueue {
	fn default() -> Self {
		Self::new()
	}
}

impl RequestQueue {
	pub fn new() -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		Self {
			in_flight: None,
			pending: VecDeque::new(),
			scheduler: Scheduler::new(),
			last_requested: SequenceNumber::UNREQUESTED,
			last_processed: SequenceNumber::UNREQUESTED,
			tx,
			rx,
		}
	}

	/// Assigns `request` the next sequence number and dispatches or queues it.
	///
	/// Returns the assigned sequence number.
	pub fn request_checking_for(&mut self, mut request: Request, backend: &mut dyn CheckBackend) -> SequenceNumber {
		let sequence = self.last_requested.next();
		self.last_requested = sequence;
		request.sequence = sequence;

		if self.in_flight.is_none() && !self.scheduler.is_scheduled(DeferredTask::DispatchNext) {
			self.dispatch(request, backend);
		} else {
			self.enqueue(request);
		}
		sequence
	}

	/// Drains the next completion matching the in-flight request.
	///
	/// Mismatched completions discard the pending queue and are skipped.
	pub fn poll_completion(&mut self) -> Option<FinishedCheck> {
		loop {
			let completion = self.rx.try_recv().ok()?;
			let Some(in_flight) = self.in_flight.take_if(|f| f.request.sequence == completion.sequence) else {
				warn!(
					seq = %completion.sequence,
					in_flight = ?self.in_flight.as_ref().map(|f| f.request.sequence),
					dropped = self.pending.len(),
					"check.queue.stale"
				);
				self.discard_pending();
				continue;
			};
			return Some(self.finish(in_flight.request, completion.outcome));
		}
	}

	/// Runs deferred tasks, returning how many ran.
	pub fn run_deferred(&mut self, backend: &mut dyn CheckBackend) -> usize {
		let mut ran = 0;
		while let Some(task) = self.scheduler.pop() {
			ran += 1;
			match task {
				DeferredTask::DispatchNext => {
					if self.in_flight.is_some() {
						continue;
					}
					if let Some(next) = self.pending.pop_front() {
						self.dispatch(next, backend);
					}
				}
			}
		}
		ran
	}

	/// Cancels the in-flight request.
	///
	/// Returns `None` when nothing is in flight or the backend already replied; the
	/// reply then wins and is delivered by [`Self::poll_completion`].
	pub fn cancel_check(&mut self) -> Option<FinishedCheck> {
		let in_flight = self.in_flight.as_ref()?;
		if in_flight.fired.swap(true, Ordering::AcqRel) {
			trace!(seq = %in_flight.request.sequence, "check.queue.cancel_lost");
			return None;
		}
		let in_flight = self.in_flight.take()?;
		debug!(seq = %in_flight.request.sequence, "check.queue.cancel");
		Some(self.finish(in_flight.request, CheckOutcome::Cancelled))
	}

	/// The request currently with the backend.
	pub fn in_flight(&self) -> Option<&Request> {
		self.in_flight.as_ref().map(|f| &f.request)
	}

	pub fn is_checking(&self) -> bool {
		self.in_flight.is_some()
	}

	/// Requests waiting for dispatch, in dispatch order.
	pub fn pending(&self) -> impl Iterator<Item = &Request> {
		self.pending.iter()
	}

	pub fn pending_len(&self) -> usize {
		self.pending.len()
	}

	/// Returns true if a deferred dispatch is waiting to run.
	pub fn has_deferred(&self) -> bool {
		!self.scheduler.is_empty()
	}

	pub fn last_requested_sequence(&self) -> SequenceNumber {
		self.last_requested
	}

	pub fn last_processed_sequence(&self) -> SequenceNumber {
		self.last_processed
	}

	/// Returns true if nothing is in flight, queued or deferred.
	pub fn is_idle(&self) -> bool {
		self.in_flight.is_none() && self.pending.is_empty() && self.scheduler.is_empty()
	}

	fn dispatch(&mut self, mut request: Request, backend: &mut dyn CheckBackend) {
		request.state = RequestState::InFlight;
		let fired = Arc::new(AtomicBool::new(false));
		let reply = CheckReply::new(request.sequence, Arc::clone(&fired), self.tx.clone());
		debug!(
			seq = %request.sequence,
			root = %request.root(),
			chain = request.chain(),
			mode = ?request.mode(),
			chars = request.check_range().len(),
			queued = self.pending.len(),
			"check.queue.dispatch"
		);
		let in_flight = self.in_flight.insert(InFlight { request, fired });
		backend.request_async_check(&in_flight.request, reply);
	}

	fn enqueue(&mut self, mut request: Request) {
		request.state = RequestState::Queued;

		if let Some(tail) = self.pending.back()
			&& request.continues(tail)
		{
			debug!(seq = %request.sequence, chain = request.chain(), "check.queue.continue");
			self.pending.push_back(request);
			return;
		}

		if let Some(slot) = self.pending.iter_mut().find(|queued| queued.root() == request.root()) {
			let replaced = std::mem::replace(slot, request);
			debug!(
				seq = %slot.sequence,
				replaced = %replaced.sequence,
				root = %slot.root(),
				"check.queue.coalesce"
			);
			return;
		}

		debug!(seq = %request.sequence, queued = self.pending.len() + 1, "check.queue.enqueue");
		self.pending.push_back(request);
	}

	fn finish(&mut self, mut request: Request, outcome: CheckOutcome) -> FinishedCheck {
		request.state = match outcome {
			CheckOutcome::Succeeded(_) => RequestState::Completed,
			CheckOutcome::Cancelled => RequestState::Cancelled,
		};
		self.last_processed = request.sequence;
		if !self.pending.is_empty() {
			self.scheduler.schedule(DeferredTask::DispatchNext);
		}
		FinishedCheck { request, outcome }
	}

	fn discard_pending(&mut self) {
		self.pending.clear();
		self.scheduler.clear();
	}
}

impl Drop for RequestQueue {
	fn drop(&mut self) {
		if let Some(in_flight) = self.in_flight.take() {
			in_flight.fired.store(true, Ordering::Release);
			debug!(seq = %in_flight.request.sequence, "check.queue.detach");
		}
	}
}
