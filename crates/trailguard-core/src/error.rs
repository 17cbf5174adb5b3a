// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the capture core.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
	/// Action name outside create/update/delete/login.
	#[error("invalid audit action: {0}")]
	InvalidAction(String),

	/// Tier name outside info/warning/critical.
	#[error("invalid severity tier: {0}")]
	InvalidSeverity(String),

	/// A snapshot was built from a JSON value that is not an object.
	#[error("snapshot must be a JSON object, got {0}")]
	NotAnObject(&'static str),
}
