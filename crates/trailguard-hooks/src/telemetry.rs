// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trailguard_config::LoggingConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
	#[error("failed to install tracing subscriber: {0}")]
	Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Install a global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level` when set. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| config.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);

	if config.json {
		registry.with(fmt::layer().json()).try_init()?;
	} else {
		registry.with(fmt::layer()).try_init()?;
	}

	Ok(())
}
