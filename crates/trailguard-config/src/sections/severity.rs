// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Severity policy configuration.
//!
//! Tiers are kept as strings here and validated in [`crate::load_config`];
//! `trailguard-core` turns them into a typed policy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tier names accepted in `rules` and `sensitive_floor`.
pub const SEVERITY_TIERS: &[&str] = &["info", "warning", "critical"];

fn default_rules() -> BTreeMap<String, String> {
	BTreeMap::from([
		("create".to_string(), "info".to_string()),
		("update".to_string(), "info".to_string()),
		("delete".to_string(), "warning".to_string()),
		("login".to_string(), "info".to_string()),
	])
}

fn default_sensitive_collections() -> Vec<String> {
	[
		"users",
		"employees",
		"payroll_entries",
		"receipts",
		"salary_payments",
	]
	.iter()
	.map(|s| s.to_string())
	.collect()
}

fn normalize_tier(tier: &str) -> String {
	tier.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeverityConfigLayer {
	pub rules: Option<BTreeMap<String, String>>,
	pub sensitive_collections: Option<Vec<String>>,
	pub sensitive_floor: Option<String>,
}

impl SeverityConfigLayer {
	/// Rules merge per action; the other layer wins on conflicts.
	pub fn merge(&mut self, other: Self) {
		if let Some(rules) = other.rules {
			self.rules.get_or_insert_with(BTreeMap::new).extend(rules);
		}
		if other.sensitive_collections.is_some() {
			self.sensitive_collections = other.sensitive_collections;
		}
		if other.sensitive_floor.is_some() {
			self.sensitive_floor = other.sensitive_floor;
		}
	}

	/// Tier names are normalised to lowercase.
	pub fn finalize(self) -> SeverityConfig {
		let mut rules = default_rules();
		if let Some(overrides) = self.rules {
			rules.extend(
				overrides
					.into_iter()
					.map(|(action, tier)| (action, normalize_tier(&tier))),
			);
		}

		SeverityConfig {
			rules,
			sensitive_collections: self
				.sensitive_collections
				.unwrap_or_else(default_sensitive_collections),
			sensitive_floor: self.sensitive_floor.as_deref().map(normalize_tier),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeverityConfig {
	/// Action name to tier name.
	pub rules: BTreeMap<String, String>,
	/// Collections labelled sensitive.
	pub sensitive_collections: Vec<String>,
	/// Minimum tier for sensitive collections. `None` keeps the label informational.
	pub sensitive_floor: Option<String>,
}

impl Default for SeverityConfig {
	fn default() -> Self {
		SeverityConfigLayer::default().finalize()
	}
}
