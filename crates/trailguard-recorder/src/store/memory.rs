// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::entry::AuditEntry;
use crate::error::{AuditStoreError, StoreResult};
use crate::store::{AuditStore, AuditTarget};

/// In-process store. Targets must be registered before entries can land in
/// them, mirroring a database where the audit table has to exist.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
	targets: RwLock<HashMap<String, Vec<AuditEntry>>>,
}

impl MemoryAuditStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_target(mut self, name: impl Into<String>) -> Self {
		self.targets.get_mut().entry(name.into()).or_default();
		self
	}

	pub async fn add_target(&self, name: impl Into<String>) {
		self.targets.write().await.entry(name.into()).or_default();
	}

	/// Entries persisted to `target`, in commit order.
	pub async fn entries(&self, target: &str) -> Vec<AuditEntry> {
		self
			.targets
			.read()
			.await
			.get(target)
			.cloned()
			.unwrap_or_default()
	}

	pub async fn len(&self, target: &str) -> usize {
		self.targets.read().await.get(target).map_or(0, Vec::len)
	}
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
	fn name(&self) -> &str {
		"memory"
	}

	async fn find_target(&self, name: &str) -> StoreResult<AuditTarget> {
		if self.targets.read().await.contains_key(name) {
			Ok(AuditTarget::new(name))
		} else {
			Err(AuditStoreError::TargetNotFound(name.to_string()))
		}
	}

	async fn persist(&self, target: &AuditTarget, entry: &AuditEntry) -> StoreResult<()> {
		let mut targets = self.targets.write().await;
		let entries = targets
			.get_mut(target.name())
			.ok_or_else(|| AuditStoreError::TargetNotFound(target.name().to_string()))?;
		entries.push(entry.clone());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::entry::AuditEntryDraft;
	use trailguard_core::AuditAction;

	fn entry(record_id: &str) -> AuditEntry {
		AuditEntryDraft::builder(AuditAction::Create, "posts", record_id)
			.build()
			.into()
	}

	#[tokio::test]
	async fn unknown_target_is_not_found() {
		let store = MemoryAuditStore::new();
		let err = store.find_target("audit_logs").await.unwrap_err();
		assert!(matches!(err, AuditStoreError::TargetNotFound(name) if name == "audit_logs"));
	}

	#[tokio::test]
	async fn persists_into_registered_target() {
		let store = MemoryAuditStore::new().with_target("audit_logs");
		let target = store.find_target("audit_logs").await.unwrap();

		store.persist(&target, &entry("r1")).await.unwrap();
		store.persist(&target, &entry("r2")).await.unwrap();

		let entries = store.entries("audit_logs").await;
		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0].record_id, "r1");
		assert_eq!(store.len("other").await, 0);
	}

	#[tokio::test]
	async fn add_target_after_construction() {
		let store = MemoryAuditStore::new();
		store.add_target("custom_audit").await;
		assert_eq!(store.find_target("custom_audit").await.unwrap().name(), "custom_audit");
	}
}
