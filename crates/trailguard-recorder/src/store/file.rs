// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::entry::AuditEntry;
use crate::error::{AuditStoreError, StoreResult};
use crate::store::{AuditStore, AuditTarget};

/// Append-only JSON-lines files, one per target, under a base directory.
///
/// Target `audit_logs` lives at `<dir>/audit_logs.jsonl`. A target exists once
/// its file exists; [`JsonLinesAuditStore::ensure_target`] creates it.
pub struct JsonLinesAuditStore {
	dir: PathBuf,
	handles: Mutex<HashMap<String, File>>,
}

impl JsonLinesAuditStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self {
			dir: dir.into(),
			handles: Mutex::new(HashMap::new()),
		}
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn target_path(&self, target: &str) -> StoreResult<PathBuf> {
		let valid = !target.is_empty()
			&& target
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
		if !valid {
			return Err(AuditStoreError::Permanent(format!(
				"invalid audit target name: {target:?}"
			)));
		}
		Ok(self.dir.join(format!("{target}.jsonl")))
	}

	pub async fn ensure_target(&self, target: &str) -> StoreResult<()> {
		let path = self.target_path(target)?;
		tokio::fs::create_dir_all(&self.dir)
			.await
			.map_err(|e| AuditStoreError::Transient(format!("failed to create directory: {e}")))?;
		open_append(&path).await?;
		Ok(())
	}
}

async fn open_append(path: &Path) -> StoreResult<File> {
	OpenOptions::new()
		.create(true)
		.append(true)
		.open(path)
		.await
		.map_err(|e| AuditStoreError::Transient(format!("failed to open file: {e}")))
}

pub fn format_json_line(entry: &AuditEntry) -> StoreResult<String> {
	let json = serde_json::to_string(entry)
		.map_err(|e| AuditStoreError::Permanent(format!("JSON serialization failed: {e}")))?;
	Ok(format!("{json}\n"))
}

#[async_trait]
impl AuditStore for JsonLinesAuditStore {
	fn name(&self) -> &str {
		"jsonl"
	}

	async fn find_target(&self, name: &str) -> StoreResult<AuditTarget> {
		let path = self.target_path(name)?;
		match tokio::fs::try_exists(&path).await {
			Ok(true) => Ok(AuditTarget::new(name)),
			Ok(false) => Err(AuditStoreError::TargetNotFound(name.to_string())),
			Err(e) => Err(AuditStoreError::Transient(format!(
				"failed to stat {}: {e}",
				path.display()
			))),
		}
	}

	async fn persist(&self, target: &AuditTarget, entry: &AuditEntry) -> StoreResult<()> {
		let line = format_json_line(entry)?;

		// One lock for all targets keeps each line whole.
		let mut handles = self.handles.lock().await;
		if !handles.contains_key(target.name()) {
			let file = open_append(&self.target_path(target.name())?).await?;
			handles.insert(target.name().to_string(), file);
		}
		let file = handles
			.get_mut(target.name())
			.ok_or_else(|| AuditStoreError::Permanent("file handle not initialized".to_string()))?;

		file
			.write_all(line.as_bytes())
			.await
			.map_err(|e| AuditStoreError::Transient(format!("failed to write to file: {e}")))?;

		file
			.flush()
			.await
			.map_err(|e| AuditStoreError::Transient(format!("failed to flush file: {e}")))?;

		Ok(())
	}
}
