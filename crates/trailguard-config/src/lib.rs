// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the trailguard audit capture engine.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`TRAILGUARD_*`)
//!
//! Exclusion lists, redacted field names and the severity table are plain
//! data here so hosts and tests can swap policy without touching code.
//!
//! # Usage
//!
//! ```ignore
//! use trailguard_config::load_config;
//!
//! let config = load_config()?;
//! println!("auditing into {}", config.audit.audit_collection);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::TrailguardConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailguardConfig {
	pub audit: AuditConfig,
	pub redaction: RedactionConfig,
	pub severity: SeverityConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`TRAILGUARD_*`)
/// 2. Config file (`/etc/trailguard/trailguard.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<TrailguardConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<TrailguardConfig, ConfigError> {
	load_from_sources(vec![Box::new(EnvSource)])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<TrailguardConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and finalize the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<TrailguardConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = TrailguardConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: TrailguardConfigLayer) -> Result<TrailguardConfig, ConfigError> {
	let config = TrailguardConfig {
		audit: layer.audit.unwrap_or_default().finalize(),
		redaction: layer.redaction.unwrap_or_default().finalize(),
		severity: layer.severity.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		audit_enabled = config.audit.enabled,
		audit_collection = %config.audit.audit_collection,
		excluded_collections = config.audit.excluded_collections.len(),
		redacted_fields = config.redaction.fields.len(),
		queue_capacity = config.audit.queue_capacity,
		"configuration loaded"
	);

	Ok(config)
}

fn validate_config(config: &TrailguardConfig) -> Result<(), ConfigError> {
	if config.audit.audit_collection.trim().is_empty() {
		return Err(ConfigError::Validation(
			"audit.audit_collection must not be empty".to_string(),
		));
	}

	if config.audit.queue_capacity == 0 {
		return Err(ConfigError::Validation(
			"audit.queue_capacity must be greater than zero".to_string(),
		));
	}

	if config.audit.max_in_flight == 0 {
		return Err(ConfigError::Validation(
			"audit.max_in_flight must be greater than zero".to_string(),
		));
	}

	for (action, tier) in &config.severity.rules {
		if !SEVERITY_TIERS.contains(&tier.as_str()) {
			return Err(ConfigError::Validation(format!(
				"severity rule '{action}' has unknown tier '{tier}'"
			)));
		}
	}

	if let Some(ref floor) = config.severity.sensitive_floor {
		if !SEVERITY_TIERS.contains(&floor.as_str()) {
			return Err(ConfigError::Validation(format!(
				"severity.sensitive_floor has unknown tier '{floor}'"
			)));
		}
	}

	Ok(())
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn merge_is_last_writer_wins(a in 1usize..100_000, b in 1usize..100_000) {
			let mut layer = TrailguardConfigLayer {
				audit: Some(AuditConfigLayer {
					queue_capacity: Some(a),
					..Default::default()
				}),
				..Default::default()
			};
			layer.merge(TrailguardConfigLayer {
				audit: Some(AuditConfigLayer {
					queue_capacity: Some(b),
					..Default::default()
				}),
				..Default::default()
			});
			let config = finalize(layer).unwrap();
			prop_assert_eq!(config.audit.queue_capacity, b);
		}

		#[test]
		fn excluded_collections_always_contain_audit_collection(
			name in "[a-z_]{1,16}",
			excluded in proptest::collection::vec("[a-z_]{1,16}", 0..5),
		) {
			let layer = TrailguardConfigLayer {
				audit: Some(AuditConfigLayer {
					audit_collection: Some(name.clone()),
					excluded_collections: Some(excluded),
					..Default::default()
				}),
				..Default::default()
			};
			let config = finalize(layer).unwrap();
			prop_assert!(config.audit.excluded_collections.contains(&name));
		}
	}
}
