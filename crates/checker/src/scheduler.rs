//! Deferred task queue.
//!
//! Completion handling never dispatches the next request directly. It schedules a
//! [`DeferredTask`] here instead, and the owner drains the scheduler on its next tick.
//! This keeps a backend that replies synchronously from recursing through
//! completion and dispatch.

use std::collections::VecDeque;

/// Work postponed to the next scheduler drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredTask {
	/// Dispatch the head of the pending queue.
	DispatchNext,
}

/// FIFO of deferred tasks. Scheduling a task that is already queued is a no-op.
#[derive(Debug, Default)]
pub struct Scheduler {
	tasks: VecDeque<DeferredTask>,
	scheduled_total: u64,
}

impl Scheduler {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues `task` unless an identical task is already waiting.
	pub fn schedule(&mut self, task: DeferredTask) {
		if self.tasks.contains(&task) {
			return;
		}
		self.scheduled_total += 1;
		self.tasks.push_back(task);
		tracing::trace!(
			?task,
			pending = self.tasks.len(),
			scheduled_total = self.scheduled_total,
			"check.scheduler.schedule"
		);
	}

	pub fn is_scheduled(&self, task: DeferredTask) -> bool {
		self.tasks.contains(&task)
	}

	pub fn pop(&mut self) -> Option<DeferredTask> {
		self.tasks.pop_front()
	}

	pub fn is_empty(&self) -> bool {
		self.tasks.is_empty()
	}

	pub fn clear(&mut self) {
		self.tasks.clear();
	}
}
