// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	AuditConfigLayer, LoggingConfigLayer, RedactionConfigLayer, SeverityConfigLayer,
};

/// Top-level configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrailguardConfigLayer {
	#[serde(default)]
	pub audit: Option<AuditConfigLayer>,
	#[serde(default)]
	pub redaction: Option<RedactionConfigLayer>,
	#[serde(default)]
	pub severity: Option<SeverityConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl TrailguardConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: TrailguardConfigLayer) {
		merge_option(&mut self.audit, other.audit, AuditConfigLayer::merge);
		merge_option(
			&mut self.redaction,
			other.redaction,
			RedactionConfigLayer::merge,
		);
		merge_option(
			&mut self.severity,
			other.severity,
			SeverityConfigLayer::merge,
		);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}
