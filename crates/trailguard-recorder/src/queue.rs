// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bounded draft queue with an explicit overflow policy.
//!
//! `tokio::sync::mpsc` cannot evict from the receiving end, so drop-oldest
//! needs its own ring buffer. Producers never wait: [`DraftQueue::push`] is
//! synchronous and the lock is only held for a `VecDeque` operation.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use trailguard_config::QueueOverflowPolicy;

use crate::entry::AuditEntryDraft;
use crate::recorder::RecordOutcome;

struct QueueState {
	items: VecDeque<AuditEntryDraft>,
	closed: bool,
}

pub(crate) struct DraftQueue {
	state: Mutex<QueueState>,
	notify: Notify,
	capacity: usize,
	policy: QueueOverflowPolicy,
}

impl DraftQueue {
	pub(crate) fn new(capacity: usize, policy: QueueOverflowPolicy) -> Self {
		let capacity = capacity.max(1);
		Self {
			state: Mutex::new(QueueState {
				items: VecDeque::with_capacity(capacity.min(1024)),
				closed: false,
			}),
			notify: Notify::new(),
			capacity,
			policy,
		}
	}

	fn lock(&self) -> MutexGuard<'_, QueueState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	pub(crate) fn push(&self, draft: AuditEntryDraft) -> RecordOutcome {
		let outcome = {
			let mut state = self.lock();
			if state.closed {
				return RecordOutcome::Closed;
			}

			if state.items.len() < self.capacity {
				state.items.push_back(draft);
				RecordOutcome::Queued
			} else {
				match self.policy {
					QueueOverflowPolicy::DropNewest => return RecordOutcome::DroppedNewest,
					QueueOverflowPolicy::DropOldest => {
						state.items.pop_front();
						state.items.push_back(draft);
						RecordOutcome::DroppedOldest
					}
				}
			}
		};

		self.notify.notify_one();
		outcome
	}

	/// Wait for the next draft. Returns `None` once the queue is closed and
	/// empty.
	pub(crate) async fn pop(&self) -> Option<AuditEntryDraft> {
		loop {
			let notified = self.notify.notified();
			{
				let mut state = self.lock();
				if let Some(draft) = state.items.pop_front() {
					return Some(draft);
				}
				if state.closed {
					return None;
				}
			}
			notified.await;
		}
	}

	pub(crate) fn close(&self) {
		self.lock().closed = true;
		self.notify.notify_waiters();
		self.notify.notify_one();
	}

	pub(crate) fn len(&self) -> usize {
		self.lock().items.len()
	}
}
