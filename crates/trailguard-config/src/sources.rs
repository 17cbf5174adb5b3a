// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::TrailguardConfigLayer;
use crate::sections::{
	AuditConfigLayer, LoggingConfigLayer, QueueOverflowPolicy, RedactionConfigLayer,
	SeverityConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<TrailguardConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<TrailguardConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(TrailguardConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/trailguard/trailguard.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<TrailguardConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(TrailguardConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: TrailguardConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: TRAILGUARD_<SECTION>_<FIELD>. Lists are comma-separated;
/// severity rules are `action=tier` pairs.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<TrailguardConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(TrailguardConfigLayer {
			audit: Some(load_audit_from_env()?),
			redaction: Some(load_redaction_from_env()),
			severity: Some(load_severity_from_env()?),
			logging: Some(load_logging_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_usize(name: &str) -> Result<Option<usize>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid usize value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_list(name: &str) -> Option<Vec<String>> {
	env_var(name).map(|v| parse_list(&v))
}

pub(crate) fn parse_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}

pub(crate) fn parse_rules(
	key: &str,
	value: &str,
) -> Result<BTreeMap<String, String>, ConfigError> {
	let mut rules = BTreeMap::new();
	for pair in parse_list(value) {
		let (action, tier) = pair.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
			key: key.to_string(),
			message: format!("expected action=tier, got '{pair}'"),
		})?;
		rules.insert(action.trim().to_string(), tier.trim().to_lowercase());
	}
	Ok(rules)
}

fn load_audit_from_env() -> Result<AuditConfigLayer, ConfigError> {
	let queue_overflow_policy = match env_var("TRAILGUARD_AUDIT_QUEUE_OVERFLOW_POLICY") {
		Some(v) => Some(QueueOverflowPolicy::parse(&v).ok_or_else(|| {
			ConfigError::InvalidValue {
				key: "TRAILGUARD_AUDIT_QUEUE_OVERFLOW_POLICY".to_string(),
				message: format!("unknown overflow policy '{v}'"),
			}
		})?),
		None => None,
	};

	Ok(AuditConfigLayer {
		enabled: env_bool("TRAILGUARD_AUDIT_ENABLED"),
		audit_collection: env_var("TRAILGUARD_AUDIT_COLLECTION"),
		excluded_collections: env_list("TRAILGUARD_AUDIT_EXCLUDED_COLLECTIONS"),
		anonymous_username: env_var("TRAILGUARD_AUDIT_ANONYMOUS_USERNAME"),
		queue_capacity: env_usize("TRAILGUARD_AUDIT_QUEUE_CAPACITY")?,
		queue_overflow_policy,
		max_in_flight: env_usize("TRAILGUARD_AUDIT_MAX_IN_FLIGHT")?,
	})
}

fn load_redaction_from_env() -> RedactionConfigLayer {
	RedactionConfigLayer {
		fields: env_list("TRAILGUARD_REDACTION_FIELDS"),
		marker: env_var("TRAILGUARD_REDACTION_MARKER"),
	}
}

fn load_severity_from_env() -> Result<SeverityConfigLayer, ConfigError> {
	let rules = env_var("TRAILGUARD_SEVERITY_RULES")
		.map(|v| parse_rules("TRAILGUARD_SEVERITY_RULES", &v))
		.transpose()?;

	Ok(SeverityConfigLayer {
		rules,
		sensitive_collections: env_list("TRAILGUARD_SEVERITY_SENSITIVE_COLLECTIONS"),
		sensitive_floor: env_var("TRAILGUARD_SEVERITY_SENSITIVE_FLOOR"),
	})
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("TRAILGUARD_LOG_LEVEL"),
		json: env_bool("TRAILGUARD_LOG_JSON"),
	}
}
