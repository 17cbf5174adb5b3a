// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit storage backends.
//!
//! A store resolves a logical target name (for example `audit_logs`) to an
//! [`AuditTarget`] and appends entries to it.

use async_trait::async_trait;

use crate::entry::AuditEntry;
use crate::error::StoreResult;

mod memory;

#[cfg(feature = "store-file")]
mod file;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::MemoryAuditStore;

#[cfg(feature = "store-file")]
pub use file::JsonLinesAuditStore;
#[cfg(feature = "store-sqlite")]
pub use sqlite::SqliteAuditStore;

/// A resolved storage location for audit entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuditTarget {
	name: String,
}

impl AuditTarget {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

#[async_trait]
pub trait AuditStore: Send + Sync {
	fn name(&self) -> &str;

	/// Resolve a target by logical name. Fails with
	/// [`crate::AuditStoreError::TargetNotFound`] if it does not exist.
	async fn find_target(&self, name: &str) -> StoreResult<AuditTarget>;

	/// Append one entry to `target`.
	async fn persist(&self, target: &AuditTarget, entry: &AuditEntry) -> StoreResult<()>;

	/// Checked once when a recorder starts. A failure is logged and recording
	/// proceeds.
	async fn health_check(&self) -> StoreResult<()> {
		Ok(())
	}
}
