// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The narrow surface a data-store host exposes to audit capture.
//!
//! A host calls back into [`MutationHooks`] for every create, update, delete
//! and password authentication, passing what it knows about the request and a
//! [`Next`] continuation that performs the real operation.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use trailguard_core::{CoreError, RecordSnapshot};

/// Opaque error from the host's own operation. Audit capture never inspects
/// or wraps it.
pub type HostError = Box<dyn std::error::Error + Send + Sync>;

pub type HostResult<T> = Result<T, HostError>;

/// Continuation that runs the underlying operation.
pub type Next<T> = Box<dyn FnOnce() -> BoxFuture<'static, HostResult<T>> + Send>;

/// Box an async closure as a [`Next`].
pub fn next_fn<T, F, Fut>(f: F) -> Next<T>
where
	F: FnOnce() -> Fut + Send + 'static,
	Fut: Future<Output = HostResult<T>> + Send + 'static,
{
	Box::new(move || Box::pin(f()))
}

/// A record as the host stores it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
	pub collection: String,
	pub id: String,
	pub fields: RecordSnapshot,
}

impl StoredRecord {
	pub fn new(
		collection: impl Into<String>,
		id: impl Into<String>,
		fields: RecordSnapshot,
	) -> Self {
		Self {
			collection: collection.into(),
			id: id.into(),
			fields,
		}
	}

	/// Build from a JSON object. Fails for any other JSON value.
	pub fn from_json(
		collection: impl Into<String>,
		id: impl Into<String>,
		fields: Value,
	) -> Result<Self, CoreError> {
		let fields = RecordSnapshot::try_from(fields)?;
		Ok(Self::new(collection, id, fields))
	}

	/// Copy of the record's fields for capture.
	pub fn snapshot(&self) -> RecordSnapshot {
		self.fields.clone()
	}
}

/// A create request. The record does not exist yet; the continuation returns
/// it as committed.
#[derive(Debug, Clone)]
pub struct CreateEvent {
	pub collection: String,
	pub auth: Option<StoredRecord>,
}

/// An update request carrying the record as currently stored.
#[derive(Debug, Clone)]
pub struct UpdateEvent {
	pub existing: StoredRecord,
	pub auth: Option<StoredRecord>,
}

/// A delete request carrying the record about to be removed.
#[derive(Debug, Clone)]
pub struct DeleteEvent {
	pub record: StoredRecord,
	pub auth: Option<StoredRecord>,
}

/// A password authentication attempt against an auth collection.
#[derive(Debug, Clone)]
pub struct AuthEvent {
	pub collection: String,
	/// Login name as submitted. Never recorded.
	pub identity: String,
}

/// Callbacks a host invokes around its mutations. Object safe, so hosts can
/// hold `Arc<dyn MutationHooks>`.
///
/// Every method must call `next` at most once and return its error unchanged
/// when it fails.
#[async_trait]
pub trait MutationHooks: Send + Sync {
	async fn on_create(
		&self,
		event: CreateEvent,
		next: Next<StoredRecord>,
	) -> HostResult<StoredRecord>;

	async fn on_update(
		&self,
		event: UpdateEvent,
		next: Next<StoredRecord>,
	) -> HostResult<StoredRecord>;

	async fn on_delete(&self, event: DeleteEvent, next: Next<()>) -> HostResult<()>;

	/// `next` yields `None` when authentication succeeded without producing a
	/// record.
	async fn on_authenticate(
		&self,
		event: AuthEvent,
		next: Next<Option<StoredRecord>>,
	) -> HostResult<Option<StoredRecord>>;
}

/// A host that accepts lifecycle hooks.
pub trait LifecycleHost {
	fn bind_create(&mut self, hooks: Arc<dyn MutationHooks>);

	fn bind_update(&mut self, hooks: Arc<dyn MutationHooks>);

	fn bind_delete(&mut self, hooks: Arc<dyn MutationHooks>);

	fn bind_authenticate(&mut self, hooks: Arc<dyn MutationHooks>);
}
