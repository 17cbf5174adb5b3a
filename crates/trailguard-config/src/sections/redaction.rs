// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Snapshot redaction configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_REDACTION_MARKER: &str = "[REDACTED]";

fn default_fields() -> Vec<String> {
	vec![
		"password".to_string(),
		"tokenKey".to_string(),
		"passwordHash".to_string(),
	]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RedactionConfigLayer {
	pub fields: Option<Vec<String>>,
	pub marker: Option<String>,
}

impl RedactionConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.fields.is_some() {
			self.fields = other.fields;
		}
		if other.marker.is_some() {
			self.marker = other.marker;
		}
	}

	pub fn finalize(self) -> RedactionConfig {
		RedactionConfig {
			fields: self.fields.unwrap_or_else(default_fields),
			marker: self
				.marker
				.unwrap_or_else(|| DEFAULT_REDACTION_MARKER.to_string()),
		}
	}
}

/// Field names replaced by `marker` in every captured snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedactionConfig {
	pub fields: Vec<String>,
	pub marker: String,
}

impl Default for RedactionConfig {
	fn default() -> Self {
		RedactionConfigLayer::default().finalize()
	}
}
