// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type StoreResult<T> = Result<T, AuditStoreError>;

#[derive(Error, Debug)]
pub enum AuditStoreError {
	#[error("transient error: {0}")]
	Transient(String),

	#[error("permanent error: {0}")]
	Permanent(String),

	#[error("audit target '{0}' not found")]
	TargetNotFound(String),
}

impl AuditStoreError {
	/// Whether a later attempt could succeed. Recording never retries; this
	/// only classifies the failure in logs.
	pub fn is_transient(&self) -> bool {
		matches!(self, AuditStoreError::Transient(_))
	}
}
