// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Name-based credential redaction for record snapshots.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::trace;
use trailguard_config::{RedactionConfig, DEFAULT_REDACTION_MARKER};

use crate::snapshot::{RecordSnapshot, SanitizedSnapshot};

/// Deny-list of field names whose values never leave the redactor.
///
/// Matching is on the exact top-level field name; values are not inspected.
#[derive(Debug, Clone)]
pub struct RedactionPolicy {
	fields: HashSet<String>,
	marker: String,
}

impl Default for RedactionPolicy {
	fn default() -> Self {
		Self::from_config(&RedactionConfig::default())
	}
}

impl RedactionPolicy {
	pub const DEFAULT_MARKER: &'static str = DEFAULT_REDACTION_MARKER;

	pub fn new<I, S>(fields: I, marker: impl Into<String>) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			fields: fields.into_iter().map(Into::into).collect(),
			marker: marker.into(),
		}
	}

	pub fn from_config(config: &RedactionConfig) -> Self {
		Self::new(config.fields.iter().cloned(), config.marker.clone())
	}

	pub fn marker(&self) -> &str {
		&self.marker
	}

	pub fn is_redacted(&self, field: &str) -> bool {
		self.fields.contains(field)
	}

	/// Consume a raw snapshot and return its sanitized copy.
	///
	/// Every deny-listed field present in `snapshot` is replaced with the
	/// marker regardless of `collection`.
	pub fn sanitize(&self, snapshot: RecordSnapshot, collection: &str) -> SanitizedSnapshot {
		let mut redacted = 0usize;
		let fields: Map<String, Value> = snapshot
			.into_fields()
			.into_iter()
			.map(|(name, value)| {
				if self.fields.contains(&name) {
					redacted += 1;
					(name, Value::String(self.marker.clone()))
				} else {
					(name, value)
				}
			})
			.collect();

		trace!(collection, redacted, "sanitized snapshot");
		SanitizedSnapshot::new(fields)
	}
}

/// Convenience wrapper using the default credential deny-list.
pub fn sanitize(snapshot: RecordSnapshot, collection: &str) -> SanitizedSnapshot {
	RedactionPolicy::default().sanitize(snapshot, collection)
}
