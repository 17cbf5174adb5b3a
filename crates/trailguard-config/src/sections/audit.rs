// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit capture configuration section.

use serde::{Deserialize, Serialize};

const DEFAULT_QUEUE_CAPACITY: usize = 10000;
const DEFAULT_MAX_IN_FLIGHT: usize = 64;
const DEFAULT_AUDIT_COLLECTION: &str = "audit_logs";
const DEFAULT_ANONYMOUS_USERNAME: &str = "guest";

fn default_excluded_collections() -> Vec<String> {
	vec![
		DEFAULT_AUDIT_COLLECTION.to_string(),
		"sessions".to_string(),
		"backup_logs".to_string(),
	]
}

/// What the recording queue does with a draft when it is already full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueOverflowPolicy {
	/// Discard the incoming draft.
	#[default]
	DropNewest,
	/// Evict the oldest queued draft to make room for the incoming one.
	DropOldest,
}

impl QueueOverflowPolicy {
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_lowercase().as_str() {
			"drop_newest" | "drop-newest" => Some(QueueOverflowPolicy::DropNewest),
			"drop_oldest" | "drop-oldest" => Some(QueueOverflowPolicy::DropOldest),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuditConfigLayer {
	pub enabled: Option<bool>,
	pub audit_collection: Option<String>,
	pub excluded_collections: Option<Vec<String>>,
	pub anonymous_username: Option<String>,
	pub queue_capacity: Option<usize>,
	pub queue_overflow_policy: Option<QueueOverflowPolicy>,
	pub max_in_flight: Option<usize>,
}

impl AuditConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.audit_collection.is_some() {
			self.audit_collection = other.audit_collection;
		}
		if other.excluded_collections.is_some() {
			self.excluded_collections = other.excluded_collections;
		}
		if other.anonymous_username.is_some() {
			self.anonymous_username = other.anonymous_username;
		}
		if other.queue_capacity.is_some() {
			self.queue_capacity = other.queue_capacity;
		}
		if other.queue_overflow_policy.is_some() {
			self.queue_overflow_policy = other.queue_overflow_policy;
		}
		if other.max_in_flight.is_some() {
			self.max_in_flight = other.max_in_flight;
		}
	}

	pub fn finalize(self) -> AuditConfig {
		let audit_collection = self
			.audit_collection
			.unwrap_or_else(|| DEFAULT_AUDIT_COLLECTION.to_string());

		// The audit store itself is always excluded, whatever the operator lists.
		let mut excluded_collections = self
			.excluded_collections
			.unwrap_or_else(default_excluded_collections);
		if !excluded_collections.contains(&audit_collection) {
			excluded_collections.push(audit_collection.clone());
		}

		AuditConfig {
			enabled: self.enabled.unwrap_or(true),
			audit_collection,
			excluded_collections,
			anonymous_username: self
				.anonymous_username
				.unwrap_or_else(|| DEFAULT_ANONYMOUS_USERNAME.to_string()),
			queue_capacity: self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY),
			queue_overflow_policy: self.queue_overflow_policy.unwrap_or_default(),
			max_in_flight: self.max_in_flight.unwrap_or(DEFAULT_MAX_IN_FLIGHT),
		}
	}
}

/// Audit capture configuration (runtime, fully resolved).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditConfig {
	/// When false, drafts are accepted and discarded.
	pub enabled: bool,
	/// Logical name of the audit-storage target.
	pub audit_collection: String,
	/// Collections never captured. Always contains `audit_collection`.
	pub excluded_collections: Vec<String>,
	/// Username recorded when a mutation has no authenticated actor.
	pub anonymous_username: String,
	pub queue_capacity: usize,
	pub queue_overflow_policy: QueueOverflowPolicy,
	/// Persist calls allowed to run at once. Once reached, drafts wait in
	/// the queue and the overflow policy applies.
	pub max_in_flight: usize,
}

impl Default for AuditConfig {
	fn default() -> Self {
		AuditConfigLayer::default().finalize()
	}
}
