//! Check orchestration.
//!
//! [`CheckEngine`] owns the backend and the [`RequestQueue`]. It turns paragraph and
//! edit notifications into check requests and applies finished checks to a
//! [`MarkerStore`]. The store and the [`DocumentHost`] are passed into each call so the
//! caller keeps ownership of document state.
//!
//! # Asynchronous path
//!
//! Paragraphs longer than `chunk_size` are split at sentence ends and submitted as a
//! chunk chain, which the queue keeps together. Replies are picked up by
//! [`CheckEngine::tick`], which alternates between draining completions and running
//! deferred dispatches until neither makes progress.
//!
//! # Synchronous path
//!
//! With `async_enabled = false` each request is checked inline through
//! [`CheckEngine::check_text_sync`] and applied immediately, using the same result
//! application as replies.

use lectern_markers::{MarkerStore, OverlapRule};
use lectern_primitives::text::{slice_chars, word_range_at};
use lectern_primitives::{CharIdx, CharLen, Delta, MarkerTypes, NodeId, OffsetRange};
use tracing::{debug, trace};

use crate::backend::{CheckBackend, CheckOutcome};
use crate::config::CheckerConfig;
use crate::host::DocumentHost;
use crate::queue::{FinishedCheck, RequestQueue};
use crate::request::{CheckMode, CheckTypes, Request, RequestScope};

mod apply;
mod chunking;
mod sync;

pub use chunking::plan_chunks;

/// Drives checks of one document against one backend.
pub struct CheckEngine {
	config: CheckerConfig,
	backend: Box<dyn CheckBackend>,
	queue: RequestQueue,
}

impl std::fmt::Debug for CheckEngine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CheckEngine")
			.field("config", &self.config)
			.field("queue", &self.queue)
			.finish_non_exhaustive()
	}
}

impl CheckEngine {
	pub fn new(config: CheckerConfig, backend: Box<dyn CheckBackend>) -> Self {
		Self {
			config,
			backend,
			queue: RequestQueue::new(),
		}
	}

	pub fn config(&self) -> &CheckerConfig {
		&self.config
	}

	pub fn queue(&self) -> &RequestQueue {
		&self.queue
	}

	/// Returns true if a check is in flight or waiting.
	pub fn is_busy(&self) -> bool {
		!self.queue.is_idle()
	}

	/// Batch-checks the paragraph of `node` containing `offset`.
	///
	/// Returns the number of requests submitted.
	pub fn check_paragraph(
		&mut self,
		store: &mut MarkerStore,
		host: &mut dyn DocumentHost,
		node: NodeId,
		offset: CharIdx,
	) -> usize {
		let Some(text) = host.text(node) else {
			return 0;
		};
		let Some(paragraph) = host.paragraph_range(node, offset) else {
			return 0;
		};
		let paragraph = paragraph.clamp(text.len_chars());
		if paragraph.is_empty() {
			return 0;
		}

		let root = host.editable_root(node);
		let types = self.check_types(CheckMode::Batch);
		let paragraph_text = text.slice(paragraph.start..paragraph.end).to_string();
		let chunks = plan_chunks(&paragraph_text, self.config.chunk_size);
		debug!(
			node = %node,
			root = %root,
			chars = paragraph.len(),
			chunks = chunks.len(),
			"check.paragraph"
		);

		let submitted = chunks.len();
		for (chain, chunk) in chunks.into_iter().enumerate() {
			let scope = RequestScope {
				root,
				node,
				text_start: paragraph.start + chunk.start,
			};
			let prior = chunking::prior_markers(store, node, chunk.shift(paragraph.start as Delta), types);
			let request = Request::new(
				scope,
				slice_chars(&paragraph_text, chunk).to_owned(),
				OffsetRange::new(0, chunk.len()),
				types,
				CheckMode::Batch,
			)
			.with_chain(chain as u32)
			.with_prior_markers(prior);
			self.submit(store, host, request);
		}
		submitted
	}

	/// Incrementally checks `range` of `node`, sending surrounding paragraph text as
	/// context.
	///
	/// Returns false if there was nothing to check.
	pub fn check_range(
		&mut self,
		store: &mut MarkerStore,
		host: &mut dyn DocumentHost,
		node: NodeId,
		range: OffsetRange,
	) -> bool {
		let Some(text) = host.text(node) else {
			return false;
		};
		let len = text.len_chars();
		let range = range.clamp(len);
		if range.is_empty() {
			return false;
		}

		let paragraph = host
			.paragraph_range(node, range.start)
			.unwrap_or(OffsetRange::new(0, len));
		let context_chars = self.config.context_chars;
		let context = OffsetRange::new(
			range.start.saturating_sub(context_chars).max(paragraph.start.min(range.start)),
			(range.end + context_chars).min(paragraph.end).max(range.end),
		);

		let types = self.check_types(CheckMode::Incremental);
		let scope = RequestScope {
			root: host.editable_root(node),
			node,
			text_start: context.start,
		};
		let request = Request::new(
			scope,
			text.slice(context.start..context.end).to_string(),
			OffsetRange::new(range.start - context.start, range.end - context.start),
			types,
			CheckMode::Incremental,
		)
		.with_prior_markers(chunking::prior_markers(store, node, context, types));
		trace!(node = %node, start = range.start, end = range.end, "check.range");
		self.submit(store, host, request);
		true
	}

	/// Checks the word at the caret, or the word just finished before it.
	pub fn check_word_at_caret(&mut self, store: &mut MarkerStore, host: &mut dyn DocumentHost) -> bool {
		let Some(caret) = host.selection() else {
			return false;
		};
		let Some(text) = host.text(caret.node) else {
			return false;
		};
		let slice = text.slice(..);
		let word = word_range_at(slice, caret.offset)
			.or_else(|| caret.offset.checked_sub(1).and_then(|before| word_range_at(slice, before)));
		match word {
			Some(word) => self.check_range(store, host, caret.node, word),
			None => false,
		}
	}

	/// Keeps markers aligned with a text edit of `node`.
	///
	/// `removed` chars at `offset` were replaced by `inserted` chars. Markers inside the
	/// removed text go away, spelling and grammar markers touching the edit point are
	/// dropped since their word is being retyped, and later markers shift.
	pub fn note_edit(&mut self, store: &mut MarkerStore, node: NodeId, offset: CharIdx, removed: CharLen, inserted: CharLen) {
		if removed > 0 {
			store.remove_markers_in_range(node, offset, removed, MarkerTypes::all(), OverlapRule::KeepResidue);
			store.shift_markers(node, offset + removed, -(removed as Delta));
		}

		let edited = OffsetRange::new(offset.saturating_sub(1), offset + 1);
		store.remove_markers_in_range(
			node,
			edited.start,
			edited.len(),
			MarkerTypes::CHECKING,
			OverlapRule::RemoveWhole,
		);

		if inserted > 0 {
			store.shift_markers(node, offset, inserted as Delta);
		}
		trace!(node = %node, offset, removed, inserted, "check.edit");
	}

	/// Applies finished checks and dispatches queued ones.
	///
	/// Returns the number of checks applied.
	pub fn tick(&mut self, store: &mut MarkerStore, host: &mut dyn DocumentHost) -> usize {
		let mut applied = 0;
		loop {
			let mut progressed = false;
			while let Some(finished) = self.queue.poll_completion() {
				self.finish(store, host, finished);
				applied += 1;
				progressed = true;
			}
			if self.queue.run_deferred(&mut *self.backend) > 0 {
				progressed = true;
			}
			if !progressed {
				break;
			}
		}
		applied
	}

	/// Cancels the in-flight check. Markers it would have replaced are kept.
	pub fn cancel_check(&mut self, store: &mut MarkerStore, host: &mut dyn DocumentHost) -> bool {
		match self.queue.cancel_check() {
			Some(finished) => {
				self.finish(store, host, finished);
				true
			}
			None => false,
		}
	}

	fn check_types(&self, mode: CheckMode) -> CheckTypes {
		let mut types = CheckTypes::SPELLING;
		if self.config.check_grammar {
			types |= CheckTypes::GRAMMAR;
		}
		if self.config.auto_correct && mode == CheckMode::Incremental {
			types |= CheckTypes::CORRECTION;
		}
		types
	}

	fn submit(&mut self, store: &mut MarkerStore, host: &mut dyn DocumentHost, request: Request) {
		if self.config.async_enabled {
			self.queue.request_checking_for(request, &mut *self.backend);
		} else {
			let results = self.check_text_sync(request.text(), request.types());
			self.apply_results(store, host, &request, results);
		}
	}

	fn finish(&mut self, store: &mut MarkerStore, host: &mut dyn DocumentHost, finished: FinishedCheck) {
		let FinishedCheck { request, outcome } = finished;
		match outcome {
			CheckOutcome::Succeeded(results) => {
				self.apply_results(store, host, &request, results);
			}
			CheckOutcome::Cancelled => {
				debug!(seq = %request.sequence(), root = %request.root(), "check.cancelled");
			}
		}
	}
}
