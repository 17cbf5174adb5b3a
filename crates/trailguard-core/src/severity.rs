// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Severity tiers and the policy that assigns them.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;
use trailguard_config::SeverityConfig;

use crate::action::AuditAction;
use crate::error::CoreError;

/// Severity tiers attached to audit entries for downstream filtering and alerting.
///
/// The numeric values are RFC 5424 syslog codes so that forwarders can map
/// them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
	#[default]
	Info = 6,
	Warning = 4,
	Critical = 2,
}

impl AuditSeverity {
	/// Returns the RFC 5424 numeric severity code.
	pub fn as_syslog_code(&self) -> u8 {
		*self as u8
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			AuditSeverity::Info => "info",
			AuditSeverity::Warning => "warning",
			AuditSeverity::Critical => "critical",
		}
	}

	/// Returns all tiers from most to least severe.
	pub fn all() -> &'static [AuditSeverity] {
		&[
			AuditSeverity::Critical,
			AuditSeverity::Warning,
			AuditSeverity::Info,
		]
	}
}

impl PartialOrd for AuditSeverity {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for AuditSeverity {
	fn cmp(&self, other: &Self) -> Ordering {
		// Lower numeric value = higher severity (Critical=2 > Info=6)
		(*other as u8).cmp(&(*self as u8))
	}
}

impl fmt::Display for AuditSeverity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for AuditSeverity {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"info" => Ok(AuditSeverity::Info),
			"warning" => Ok(AuditSeverity::Warning),
			"critical" => Ok(AuditSeverity::Critical),
			other => Err(CoreError::InvalidSeverity(other.to_string())),
		}
	}
}

/// Maps `(action, collection)` to a severity tier.
///
/// Actions without a rule are `Info`. Sensitive collections are only a
/// label unless `sensitive_floor` is set, in which case their entries are
/// raised to at least that tier.
#[derive(Debug, Clone)]
pub struct SeverityPolicy {
	rules: HashMap<String, AuditSeverity>,
	sensitive_collections: HashSet<String>,
	sensitive_floor: Option<AuditSeverity>,
}

impl Default for SeverityPolicy {
	fn default() -> Self {
		Self::from_config(&SeverityConfig::default())
	}
}

impl SeverityPolicy {
	/// An empty policy: everything is `Info` and nothing is sensitive.
	pub fn empty() -> Self {
		Self {
			rules: HashMap::new(),
			sensitive_collections: HashSet::new(),
			sensitive_floor: None,
		}
	}

	pub fn from_config(config: &SeverityConfig) -> Self {
		let mut rules = HashMap::with_capacity(config.rules.len());
		for (action, tier) in &config.rules {
			match tier.parse::<AuditSeverity>() {
				Ok(severity) => {
					rules.insert(action.clone(), severity);
				}
				Err(e) => warn!(action = %action, error = %e, "ignoring severity rule"),
			}
		}

		let sensitive_floor = config.sensitive_floor.as_deref().and_then(|tier| {
			tier
				.parse::<AuditSeverity>()
				.map_err(|e| warn!(error = %e, "ignoring sensitive severity floor"))
				.ok()
		});

		Self {
			rules,
			sensitive_collections: config.sensitive_collections.iter().cloned().collect(),
			sensitive_floor,
		}
	}

	pub fn with_rule(mut self, action: impl Into<String>, severity: AuditSeverity) -> Self {
		self.rules.insert(action.into(), severity);
		self
	}

	pub fn with_sensitive_collection(mut self, collection: impl Into<String>) -> Self {
		self.sensitive_collections.insert(collection.into());
		self
	}

	pub fn with_sensitive_floor(mut self, severity: AuditSeverity) -> Self {
		self.sensitive_floor = Some(severity);
		self
	}

	pub fn classify(&self, action: AuditAction, collection: &str) -> AuditSeverity {
		self.classify_named(action.as_str(), collection)
	}

	/// Classify an arbitrary host action name. Unknown names are `Info`.
	pub fn classify_named(&self, action: &str, collection: &str) -> AuditSeverity {
		let base = self.rules.get(action).copied().unwrap_or_default();

		match self.sensitive_floor {
			Some(floor) if self.is_sensitive(collection) => base.max(floor),
			_ => base,
		}
	}

	pub fn is_sensitive(&self, collection: &str) -> bool {
		self.sensitive_collections.contains(collection)
	}
}
