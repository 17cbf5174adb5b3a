// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::entry::AuditEntry;
use crate::error::{AuditStoreError, StoreResult};
use crate::store::{AuditStore, AuditTarget};

/// Writes audit entries as rows of a SQLite table named after the target.
pub struct SqliteAuditStore {
	pool: SqlitePool,
	name: String,
}

impl SqliteAuditStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self {
			pool,
			name: "sqlite".to_string(),
		}
	}

	/// Create the audit table for `target` if it does not exist yet.
	pub async fn ensure_target(&self, target: &str) -> StoreResult<()> {
		let table = quoted_identifier(target)?;

		sqlx::query(&format!(
			r#"
			CREATE TABLE IF NOT EXISTS {table} (
				id TEXT PRIMARY KEY,
				action TEXT NOT NULL,
				collection TEXT NOT NULL,
				record_id TEXT NOT NULL,
				username TEXT NOT NULL,
				user_id TEXT NOT NULL,
				timestamp TEXT NOT NULL,
				severity TEXT NOT NULL,
				changes TEXT,
				metadata TEXT,
				old_data_hash TEXT,
				new_data_hash TEXT
			)
			"#
		))
		.execute(&self.pool)
		.await
		.map_err(classify_error)?;

		Ok(())
	}
}

#[async_trait]
impl AuditStore for SqliteAuditStore {
	fn name(&self) -> &str {
		&self.name
	}

	async fn find_target(&self, name: &str) -> StoreResult<AuditTarget> {
		let found: Option<String> =
			sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
				.bind(name)
				.fetch_optional(&self.pool)
				.await
				.map_err(classify_error)?;

		match found {
			Some(table) => Ok(AuditTarget::new(table)),
			None => Err(AuditStoreError::TargetNotFound(name.to_string())),
		}
	}

	async fn persist(&self, target: &AuditTarget, entry: &AuditEntry) -> StoreResult<()> {
		let table = quoted_identifier(target.name())?;

		let changes_json = entry
			.changes
			.as_ref()
			.map(serde_json::to_string)
			.transpose()
			.map_err(|e| AuditStoreError::Permanent(format!("failed to serialize changes: {e}")))?;

		let metadata_json = entry
			.metadata
			.as_ref()
			.map(serde_json::to_string)
			.transpose()
			.map_err(|e| AuditStoreError::Permanent(format!("failed to serialize metadata: {e}")))?;

		sqlx::query(&format!(
			r#"
			INSERT INTO {table} (
				id, action, collection, record_id, username, user_id,
				timestamp, severity, changes, metadata, old_data_hash, new_data_hash
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#
		))
		.bind(entry.id.to_string())
		.bind(entry.action.as_str())
		.bind(&entry.collection)
		.bind(&entry.record_id)
		.bind(&entry.username)
		.bind(&entry.user_id)
		.bind(entry.timestamp.to_rfc3339())
		.bind(entry.severity.as_str())
		.bind(&changes_json)
		.bind(&metadata_json)
		.bind(entry.old_data_hash.as_ref().map(|h| h.as_str().to_string()))
		.bind(entry.new_data_hash.as_ref().map(|h| h.as_str().to_string()))
		.execute(&self.pool)
		.await
		.map_err(classify_error)?;

		Ok(())
	}

	async fn health_check(&self) -> StoreResult<()> {
		sqlx::query("SELECT 1")
			.execute(&self.pool)
			.await
			.map_err(|e| AuditStoreError::Transient(format!("health check failed: {e}")))?;
		Ok(())
	}
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
fn quoted_identifier(name: &str) -> StoreResult<String> {
	let valid = !name.is_empty()
		&& name
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '_')
		&& !name.starts_with(|c: char| c.is_ascii_digit());

	if valid {
		Ok(format!("\"{name}\""))
	} else {
		Err(AuditStoreError::Permanent(format!(
			"invalid audit table name: {name:?}"
		)))
	}
}

fn classify_error(e: sqlx::Error) -> AuditStoreError {
	if is_transient_error(&e) {
		AuditStoreError::Transient(format!("database error: {e}"))
	} else {
		AuditStoreError::Permanent(format!("database error: {e}"))
	}
}

fn is_transient_error(e: &sqlx::Error) -> bool {
	match e {
		sqlx::Error::Io(_) => true,
		sqlx::Error::PoolTimedOut => true,
		sqlx::Error::PoolClosed => true,
		sqlx::Error::Database(db_err) => {
			let msg = db_err.message().to_lowercase();
			msg.contains("busy") || msg.contains("locked") || msg.contains("timeout")
		}
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::entry::AuditEntryDraft;
	use serde_json::json;
	use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
	use sqlx::Row;
	use std::str::FromStr;
	use trailguard_core::{digest, sanitize, AuditAction, AuditSeverity, RecordSnapshot};

	async fn create_test_pool() -> SqlitePool {
		let options = SqliteConnectOptions::from_str(":memory:")
			.unwrap()
			.create_if_missing(true);

		SqlitePoolOptions::new()
			.max_connections(1)
			.connect_with(options)
			.await
			.expect("Failed to create test pool")
	}

	#[tokio::test]
	async fn missing_table_is_not_found() {
		let store = SqliteAuditStore::new(create_test_pool().await);
		let err = store.find_target("audit_logs").await.unwrap_err();
		assert!(matches!(err, AuditStoreError::TargetNotFound(_)));
	}

	#[tokio::test]
	async fn persists_entry_row() {
		let pool = create_test_pool().await;
		let store = SqliteAuditStore::new(pool.clone());
		store.ensure_target("audit_logs").await.unwrap();
		let target = store.find_target("audit_logs").await.unwrap();

		let snapshot = sanitize(
			RecordSnapshot::try_from(json!({"username": "alice", "password": "secret"})).unwrap(),
			"users",
		);
		let entry: AuditEntry = AuditEntryDraft::builder(AuditAction::Delete, "users", "u1")
			.actor("admin", "a1")
			.severity(AuditSeverity::Warning)
			.snapshot(&snapshot)
			.old_data_hash(digest(&snapshot))
			.build()
			.into();
		store.persist(&target, &entry).await.unwrap();

		let row = sqlx::query("SELECT * FROM audit_logs WHERE id = ?")
			.bind(entry.id.to_string())
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(row.get::<String, _>("action"), "delete");
		assert_eq!(row.get::<String, _>("severity"), "warning");
		assert_eq!(row.get::<String, _>("username"), "admin");
		assert_eq!(row.get::<Option<String>, _>("new_data_hash"), None);
		assert_eq!(row.get::<Option<String>, _>("metadata"), None);

		let changes: serde_json::Value =
			serde_json::from_str(&row.get::<String, _>("changes")).unwrap();
		assert_eq!(changes["password"], "[REDACTED]");
		assert_eq!(
			row.get::<Option<String>, _>("old_data_hash").map(|h| h.len()),
			Some(64)
		);
	}

	#[tokio::test]
	async fn rejects_unsafe_table_names() {
		let store = SqliteAuditStore::new(create_test_pool().await);
		let err = store.ensure_target("audit; DROP TABLE users").await.unwrap_err();
		assert!(!err.is_transient());

		let target = AuditTarget::new("1audit");
		let entry: AuditEntry = AuditEntryDraft::builder(AuditAction::Create, "posts", "r1")
			.build()
			.into();
		assert!(store.persist(&target, &entry).await.is_err());
	}

	#[tokio::test]
	async fn health_check_succeeds_on_open_pool() {
		let store = SqliteAuditStore::new(create_test_pool().await);
		store.health_check().await.unwrap();
	}
}
