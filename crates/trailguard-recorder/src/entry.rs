// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit entry model.
//!
//! Capture code assembles an [`AuditEntryDraft`] through its builder and hands
//! it to the recorder. The recorder assigns the identifier and turns the draft
//! into the persisted [`AuditEntry`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use trailguard_core::{AuditAction, AuditSeverity, ChangeSet, IntegrityHash, SanitizedSnapshot};
use uuid::Uuid;

/// Everything the capture path knows about one mutation, minus the entry id.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntryDraft {
	pub action: AuditAction,
	pub collection: String,
	pub record_id: String,
	pub username: String,
	pub user_id: String,
	/// Capture time, not commit time.
	pub captured_at: DateTime<Utc>,
	pub severity: AuditSeverity,
	pub changes: Option<Value>,
	pub metadata: Option<Value>,
	pub old_data_hash: Option<IntegrityHash>,
	pub new_data_hash: Option<IntegrityHash>,
}

impl AuditEntryDraft {
	pub fn builder(
		action: AuditAction,
		collection: impl Into<String>,
		record_id: impl Into<String>,
	) -> AuditEntryDraftBuilder {
		AuditEntryDraftBuilder::new(action, collection, record_id)
	}
}

/// Builder for [`AuditEntryDraft`].
#[derive(Debug)]
pub struct AuditEntryDraftBuilder {
	action: AuditAction,
	collection: String,
	record_id: String,
	username: String,
	user_id: String,
	captured_at: Option<DateTime<Utc>>,
	severity: AuditSeverity,
	changes: Option<Value>,
	metadata: Option<Value>,
	old_data_hash: Option<IntegrityHash>,
	new_data_hash: Option<IntegrityHash>,
}

impl AuditEntryDraftBuilder {
	pub fn new(
		action: AuditAction,
		collection: impl Into<String>,
		record_id: impl Into<String>,
	) -> Self {
		Self {
			action,
			collection: collection.into(),
			record_id: record_id.into(),
			username: String::new(),
			user_id: String::new(),
			captured_at: None,
			severity: AuditSeverity::default(),
			changes: None,
			metadata: None,
			old_data_hash: None,
			new_data_hash: None,
		}
	}

	pub fn actor(mut self, username: impl Into<String>, user_id: impl Into<String>) -> Self {
		self.username = username.into();
		self.user_id = user_id.into();
		self
	}

	pub fn severity(mut self, severity: AuditSeverity) -> Self {
		self.severity = severity;
		self
	}

	/// Pin the capture time. Defaults to the moment `build` is called.
	pub fn captured_at(mut self, at: DateTime<Utc>) -> Self {
		self.captured_at = Some(at);
		self
	}

	/// Store a field-level change set (update entries).
	pub fn changes(mut self, changes: &ChangeSet) -> Self {
		self.changes = Some(changes.to_value());
		self
	}

	/// Store a full sanitized snapshot (create and delete entries).
	pub fn snapshot(mut self, snapshot: &SanitizedSnapshot) -> Self {
		self.changes = Some(snapshot.to_value());
		self
	}

	pub fn metadata(mut self, metadata: Value) -> Self {
		self.metadata = Some(metadata);
		self
	}

	pub fn old_data_hash(mut self, hash: Option<IntegrityHash>) -> Self {
		self.old_data_hash = hash;
		self
	}

	pub fn new_data_hash(mut self, hash: Option<IntegrityHash>) -> Self {
		self.new_data_hash = hash;
		self
	}

	pub fn build(self) -> AuditEntryDraft {
		AuditEntryDraft {
			action: self.action,
			collection: self.collection,
			record_id: self.record_id,
			username: self.username,
			user_id: self.user_id,
			captured_at: self.captured_at.unwrap_or_else(Utc::now),
			severity: self.severity,
			changes: self.changes,
			metadata: self.metadata,
			old_data_hash: self.old_data_hash,
			new_data_hash: self.new_data_hash,
		}
	}
}

/// One append-only audit record as written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
	pub id: Uuid,
	pub action: AuditAction,
	pub collection: String,
	pub record_id: String,
	pub username: String,
	pub user_id: String,
	pub timestamp: DateTime<Utc>,
	pub severity: AuditSeverity,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub changes: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub old_data_hash: Option<IntegrityHash>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub new_data_hash: Option<IntegrityHash>,
}

impl From<AuditEntryDraft> for AuditEntry {
	fn from(draft: AuditEntryDraft) -> Self {
		Self {
			id: Uuid::new_v4(),
			action: draft.action,
			collection: draft.collection,
			record_id: draft.record_id,
			username: draft.username,
			user_id: draft.user_id,
			timestamp: draft.captured_at,
			severity: draft.severity,
			changes: draft.changes,
			metadata: draft.metadata,
			old_data_hash: draft.old_data_hash,
			new_data_hash: draft.new_data_hash,
		}
	}
}
