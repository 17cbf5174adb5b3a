// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lifecycle interception.
//!
//! Each request moves through `PreCapture -> UnderlyingExecuting ->
//! PostCapture -> Recorded`, or stops at `UnderlyingExecuting` when the host
//! operation fails. Capture never changes the host's result: the continuation's
//! value or error is returned as is.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument};
use trailguard_config::{AuditConfig, TrailguardConfig};
use trailguard_core::{
	diff, digest, AuditAction, IntegrityHash, RedactionPolicy, SanitizedSnapshot, SeverityPolicy,
};
use trailguard_recorder::{AuditEntryDraft, AuditEntryDraftBuilder, AuditRecorder};

use crate::host::{
	AuthEvent, CreateEvent, DeleteEvent, HostResult, MutationHooks, Next, StoredRecord, UpdateEvent,
};
use crate::identity::{resolve_actor, Actor};

/// Sanitized state of a record captured before the host mutates it.
#[derive(Debug, Clone)]
pub struct PreImage {
	snapshot: SanitizedSnapshot,
	hash: Option<IntegrityHash>,
}

impl PreImage {
	pub fn snapshot(&self) -> &SanitizedSnapshot {
		&self.snapshot
	}

	pub fn hash(&self) -> Option<&IntegrityHash> {
		self.hash.as_ref()
	}
}

pub struct AuditInterceptor {
	recorder: Arc<AuditRecorder>,
	redaction: RedactionPolicy,
	severity: SeverityPolicy,
	excluded: HashSet<String>,
	anonymous_username: String,
}

impl AuditInterceptor {
	pub fn new(recorder: Arc<AuditRecorder>, config: &TrailguardConfig) -> Self {
		Self::from_parts(
			recorder,
			&config.audit,
			RedactionPolicy::from_config(&config.redaction),
			SeverityPolicy::from_config(&config.severity),
		)
	}

	pub fn from_parts(
		recorder: Arc<AuditRecorder>,
		audit: &AuditConfig,
		redaction: RedactionPolicy,
		severity: SeverityPolicy,
	) -> Self {
		Self {
			recorder,
			redaction,
			severity,
			excluded: audit.excluded_collections.iter().cloned().collect(),
			anonymous_username: audit.anonymous_username.clone(),
		}
	}

	pub fn recorder(&self) -> &Arc<AuditRecorder> {
		&self.recorder
	}

	pub fn is_excluded(&self, collection: &str) -> bool {
		self.excluded.contains(collection)
	}

	/// Sanitize and hash `record` as it is right now.
	pub fn capture_pre_image(&self, record: &StoredRecord) -> PreImage {
		let (snapshot, hash) = self.capture(record);
		PreImage { snapshot, hash }
	}

	fn capture(&self, record: &StoredRecord) -> (SanitizedSnapshot, Option<IntegrityHash>) {
		let snapshot = self.redaction.sanitize(record.snapshot(), &record.collection);
		let hash = digest(&snapshot);
		(snapshot, hash)
	}

	fn draft(
		&self,
		action: AuditAction,
		collection: &str,
		record_id: &str,
		actor: &Actor,
	) -> AuditEntryDraftBuilder {
		AuditEntryDraft::builder(action, collection, record_id)
			.actor(&actor.username, &actor.user_id)
			.severity(self.severity.classify(action, collection))
	}

	#[instrument(skip(self, event, next), fields(collection = %event.collection))]
	pub async fn intercept_create<F, Fut>(
		&self,
		event: CreateEvent,
		next: F,
	) -> HostResult<StoredRecord>
	where
		F: FnOnce() -> Fut + Send,
		Fut: Future<Output = HostResult<StoredRecord>> + Send,
	{
		if self.is_excluded(&event.collection) {
			debug!("collection excluded from audit");
			return next().await;
		}

		let created = next().await?;

		let (snapshot, hash) = self.capture(&created);
		let actor = resolve_actor(event.auth.as_ref(), &self.anonymous_username);
		let draft = self
			.draft(AuditAction::Create, &event.collection, &created.id, &actor)
			.snapshot(&snapshot)
			.new_data_hash(hash)
			.build();
		self.recorder.record(draft);

		Ok(created)
	}

	#[instrument(
		skip(self, event, next),
		fields(collection = %event.existing.collection, record_id = %event.existing.id)
	)]
	pub async fn intercept_update<F, Fut>(
		&self,
		event: UpdateEvent,
		next: F,
	) -> HostResult<StoredRecord>
	where
		F: FnOnce() -> Fut + Send,
		Fut: Future<Output = HostResult<StoredRecord>> + Send,
	{
		if self.is_excluded(&event.existing.collection) {
			debug!("collection excluded from audit");
			return next().await;
		}

		let pre = self.capture_pre_image(&event.existing);

		let updated = next().await?;

		let (snapshot, hash) = self.capture(&updated);
		let changes = diff(&pre.snapshot, &snapshot);
		if changes.is_empty() {
			debug!("update changed no fields, not recorded");
			return Ok(updated);
		}

		let actor = resolve_actor(event.auth.as_ref(), &self.anonymous_username);
		let draft = self
			.draft(AuditAction::Update, &event.existing.collection, &event.existing.id, &actor)
			.changes(&changes)
			.old_data_hash(pre.hash)
			.new_data_hash(hash)
			.build();
		self.recorder.record(draft);

		Ok(updated)
	}

	#[instrument(
		skip(self, event, next),
		fields(collection = %event.record.collection, record_id = %event.record.id)
	)]
	pub async fn intercept_delete<F, Fut>(&self, event: DeleteEvent, next: F) -> HostResult<()>
	where
		F: FnOnce() -> Fut + Send,
		Fut: Future<Output = HostResult<()>> + Send,
	{
		if self.is_excluded(&event.record.collection) {
			debug!("collection excluded from audit");
			return next().await;
		}

		let pre = self.capture_pre_image(&event.record);

		next().await?;

		let actor = resolve_actor(event.auth.as_ref(), &self.anonymous_username);
		let draft = self
			.draft(AuditAction::Delete, &event.record.collection, &event.record.id, &actor)
			.snapshot(&pre.snapshot)
			.old_data_hash(pre.hash)
			.build();
		self.recorder.record(draft);

		Ok(())
	}

	/// Failed attempts are returned to the host and not recorded.
	#[instrument(skip(self, event, next), fields(collection = %event.collection))]
	pub async fn intercept_authenticate<F, Fut>(
		&self,
		event: AuthEvent,
		next: F,
	) -> HostResult<Option<StoredRecord>>
	where
		F: FnOnce() -> Fut + Send,
		Fut: Future<Output = HostResult<Option<StoredRecord>>> + Send,
	{
		if self.is_excluded(&event.collection) {
			debug!("collection excluded from audit");
			return next().await;
		}

		let Some(record) = next().await? else {
			debug!("authentication produced no record, not recorded");
			return Ok(None);
		};

		let actor = resolve_actor(Some(&record), &self.anonymous_username);
		let draft = self
			.draft(AuditAction::Login, &record.collection, &record.id, &actor)
			.metadata(json!({"method": "password"}))
			.build();
		self.recorder.record(draft);

		Ok(Some(record))
	}
}

#[async_trait]
impl MutationHooks for AuditInterceptor {
	async fn on_create(
		&self,
		event: CreateEvent,
		next: Next<StoredRecord>,
	) -> HostResult<StoredRecord> {
		self.intercept_create(event, next).await
	}

	async fn on_update(
		&self,
		event: UpdateEvent,
		next: Next<StoredRecord>,
	) -> HostResult<StoredRecord> {
		self.intercept_update(event, next).await
	}

	async fn on_delete(&self, event: DeleteEvent, next: Next<()>) -> HostResult<()> {
		self.intercept_delete(event, next).await
	}

	async fn on_authenticate(
		&self,
		event: AuthEvent,
		next: Next<Option<StoredRecord>>,
	) -> HostResult<Option<StoredRecord>> {
		self.intercept_authenticate(event, next).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use trailguard_recorder::MemoryAuditStore;

	fn interceptor() -> (AuditInterceptor, Arc<MemoryAuditStore>) {
		let store = Arc::new(MemoryAuditStore::new().with_target("audit_logs"));
		let config = TrailguardConfig::default();
		let recorder = Arc::new(AuditRecorder::new(store.clone(), &config.audit));
		(AuditInterceptor::new(recorder, &config), store)
	}

	#[tokio::test]
	async fn pre_image_is_sanitized_and_hashed() {
		let (interceptor, _store) = interceptor();
		let record =
			StoredRecord::from_json("users", "u1", json!({"password": "secret", "name": "a"}))
				.unwrap();

		let pre = interceptor.capture_pre_image(&record);
		assert_eq!(pre.snapshot().get("password"), Some(&json!("[REDACTED]")));
		assert_eq!(pre.hash().map(|h| h.as_str().len()), Some(64));
	}

	#[tokio::test]
	async fn pre_image_is_taken_before_the_mutation_runs() {
		let (interceptor, store) = interceptor();
		let existing = StoredRecord::from_json("posts", "p1", json!({"status": "draft"})).unwrap();

		interceptor
			.intercept_update(
				UpdateEvent {
					existing,
					auth: None,
				},
				|| async {
					Ok(StoredRecord::from_json("posts", "p1", json!({"status": "live"})).unwrap())
				},
			)
			.await
			.unwrap();
		interceptor.recorder().shutdown().await;

		let entries = store.entries("audit_logs").await;
		assert_eq!(entries.len(), 1);
		assert_eq!(
			entries[0].changes,
			Some(json!({"status": {"old": "draft", "new": "live"}}))
		);
		assert_eq!(entries[0].username, "guest");
		assert_eq!(entries[0].user_id, "");
	}

	#[tokio::test]
	async fn audit_collection_is_always_skipped() {
		let (interceptor, _store) = interceptor();
		assert!(interceptor.is_excluded("audit_logs"));
		assert!(interceptor.is_excluded("sessions"));
		assert!(!interceptor.is_excluded("posts"));
	}
}
