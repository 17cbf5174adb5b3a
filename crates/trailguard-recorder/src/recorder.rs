// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, instrument, warn};
use trailguard_config::AuditConfig;

use crate::entry::{AuditEntry, AuditEntryDraft};
use crate::queue::DraftQueue;
use crate::store::AuditStore;

/// What happened to a draft handed to [`AuditRecorder::record`].
///
/// Informational only; the capture path does not act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
	Queued,
	/// The queue was full and this draft was discarded.
	DroppedNewest,
	/// The queue was full and its oldest draft was evicted to make room.
	DroppedOldest,
	/// The recorder has been shut down.
	Closed,
	/// Recording is turned off in configuration.
	Disabled,
}

/// Fire-and-forget audit recording.
///
/// Drafts go into a bounded queue drained by one background dispatcher, which
/// spawns an independent persist task per entry. At most
/// `max_in_flight` persists run at once; while that limit is reached drafts
/// stay queued, so a stalled store fills the queue and the overflow policy
/// applies. Lookup and persist failures are logged and never reach the caller.
pub struct AuditRecorder {
	queue: Arc<DraftQueue>,
	enabled: bool,
	target: Arc<str>,
	dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl AuditRecorder {
	/// Start a recorder writing to `config.audit_collection` in `store`.
	///
	/// Must be called from within a Tokio runtime.
	pub fn new(store: Arc<dyn AuditStore>, config: &AuditConfig) -> Self {
		let queue = Arc::new(DraftQueue::new(
			config.queue_capacity,
			config.queue_overflow_policy,
		));
		let target: Arc<str> = Arc::from(config.audit_collection.as_str());

		let dispatcher = config.enabled.then(|| {
			tokio::spawn(Self::dispatch(
				Arc::clone(&queue),
				store,
				Arc::clone(&target),
				Arc::new(Semaphore::new(config.max_in_flight.max(1))),
			))
		});

		Self {
			queue,
			enabled: config.enabled,
			target,
			dispatcher: Mutex::new(dispatcher),
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn target(&self) -> &str {
		&self.target
	}

	/// Drafts waiting for the dispatcher.
	pub fn pending(&self) -> usize {
		self.queue.len()
	}

	/// Submit a draft for persistence. Never blocks.
	#[instrument(
		skip(self, draft),
		fields(
			action = %draft.action,
			collection = %draft.collection,
			record_id = %draft.record_id,
		)
	)]
	pub fn record(&self, draft: AuditEntryDraft) -> RecordOutcome {
		if !self.enabled {
			return RecordOutcome::Disabled;
		}

		let outcome = self.queue.push(draft);
		match outcome {
			RecordOutcome::DroppedNewest => {
				warn!("audit queue full, dropping newest entry");
			}
			RecordOutcome::DroppedOldest => {
				warn!("audit queue full, dropped oldest entry");
			}
			RecordOutcome::Closed => {
				warn!("audit recorder is shut down, entry discarded");
			}
			RecordOutcome::Queued | RecordOutcome::Disabled => {}
		}
		outcome
	}

	/// Stop accepting drafts, flush the queue and wait for every in-flight
	/// persist task to finish.
	pub async fn shutdown(&self) {
		self.queue.close();

		let handle = self
			.dispatcher
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.take();

		if let Some(handle) = handle {
			if let Err(e) = handle.await {
				warn!(error = %e, "audit dispatcher terminated abnormally");
			}
		}
	}

	async fn dispatch(
		queue: Arc<DraftQueue>,
		store: Arc<dyn AuditStore>,
		target: Arc<str>,
		slots: Arc<Semaphore>,
	) {
		match store.health_check().await {
			Ok(()) => debug!(store = store.name(), "audit store healthy"),
			Err(e) => warn!(
				store = store.name(),
				transient = e.is_transient(),
				error = %e,
				"audit store health check failed, recording anyway"
			),
		}

		let mut in_flight = JoinSet::new();

		loop {
			// Take a slot before the draft so the queue holds the backlog.
			let Ok(permit) = Arc::clone(&slots).acquire_owned().await else {
				break;
			};
			let Some(draft) = queue.pop().await else {
				break;
			};

			let store = Arc::clone(&store);
			let target = Arc::clone(&target);
			in_flight.spawn(async move {
				persist_entry(store, target, draft).await;
				drop(permit);
			});

			while let Some(result) = in_flight.try_join_next() {
				log_join_error(result);
			}
		}

		while let Some(result) = in_flight.join_next().await {
			log_join_error(result);
		}
	}
}

impl Drop for AuditRecorder {
	fn drop(&mut self) {
		// Lets the dispatcher drain what is queued and exit.
		self.queue.close();
	}
}

fn log_join_error(result: Result<(), tokio::task::JoinError>) {
	if let Err(e) = result {
		warn!(error = %e, "audit persist task failed");
	}
}

async fn persist_entry(
	store: Arc<dyn AuditStore>,
	target_name: Arc<str>,
	draft: AuditEntryDraft,
) {
	let entry = AuditEntry::from(draft);

	let target = match store.find_target(&target_name).await {
		Ok(target) => target,
		Err(e) => {
			warn!(
				store = store.name(),
				target = %target_name,
				entry_id = %entry.id,
				error = %e,
				"audit target lookup failed, entry dropped"
			);
			return;
		}
	};

	match store.persist(&target, &entry).await {
		Ok(()) => {
			debug!(
				store = store.name(),
				entry_id = %entry.id,
				action = %entry.action,
				collection = %entry.collection,
				"audit entry persisted"
			);
		}
		Err(e) => {
			warn!(
				store = store.name(),
				entry_id = %entry.id,
				action = %entry.action,
				collection = %entry.collection,
				transient = e.is_transient(),
				error = %e,
				"failed to persist audit entry"
			);
		}
	}
}
