// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory data-store host used by the lifecycle tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use trailguard_config::TrailguardConfig;
use trailguard_core::RecordSnapshot;
use trailguard_hooks::{
	install_audit_trail, next_fn, AuditRecorder, AuthEvent, CreateEvent, DeleteEvent, HostError,
	HostResult, LifecycleHost, MutationHooks, StoredRecord, UpdateEvent,
};
use trailguard_recorder::MemoryAuditStore;

/// Error the host returns for its own failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFailure(pub &'static str);

impl fmt::Display for HostFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::error::Error for HostFailure {}

fn fail(reason: &'static str) -> HostError {
	Box::new(HostFailure(reason))
}

type Table = Arc<Mutex<HashMap<(String, String), RecordSnapshot>>>;

/// A toy record store. Writes whose fields contain `"reject": true` fail, as
/// do deletes of records marked `"locked": true`.
#[derive(Default)]
pub struct MemoryHost {
	records: Table,
	ids: Arc<AtomicUsize>,
	create: Option<Arc<dyn MutationHooks>>,
	update: Option<Arc<dyn MutationHooks>>,
	delete: Option<Arc<dyn MutationHooks>>,
	authenticate: Option<Arc<dyn MutationHooks>>,
}

impl LifecycleHost for MemoryHost {
	fn bind_create(&mut self, hooks: Arc<dyn MutationHooks>) {
		self.create = Some(hooks);
	}

	fn bind_update(&mut self, hooks: Arc<dyn MutationHooks>) {
		self.update = Some(hooks);
	}

	fn bind_delete(&mut self, hooks: Arc<dyn MutationHooks>) {
		self.delete = Some(hooks);
	}

	fn bind_authenticate(&mut self, hooks: Arc<dyn MutationHooks>) {
		self.authenticate = Some(hooks);
	}
}

fn rejects(fields: &RecordSnapshot) -> bool {
	fields.get("reject") == Some(&Value::Bool(true))
}

impl MemoryHost {
	/// Insert a record without going through any hooks.
	pub fn seed(&self, collection: &str, id: &str, fields: Value) -> StoredRecord {
		let record = StoredRecord::from_json(collection, id, fields).unwrap();
		self.records.lock().unwrap().insert(
			(collection.to_string(), id.to_string()),
			record.fields.clone(),
		);
		record
	}

	pub fn get(&self, collection: &str, id: &str) -> Option<StoredRecord> {
		self.records
			.lock()
			.unwrap()
			.get(&(collection.to_string(), id.to_string()))
			.map(|fields| StoredRecord::new(collection, id, fields.clone()))
	}

	pub async fn create(
		&self,
		collection: &str,
		fields: Value,
		auth: Option<StoredRecord>,
	) -> HostResult<StoredRecord> {
		let records = Arc::clone(&self.records);
		let id = format!("rec{}", self.ids.fetch_add(1, Ordering::SeqCst));
		let record = StoredRecord::from_json(collection, id, fields)?;

		let next = next_fn(move || async move {
			if rejects(&record.fields) {
				return Err(fail("validation failed"));
			}
			records.lock().unwrap().insert(
				(record.collection.clone(), record.id.clone()),
				record.fields.clone(),
			);
			Ok(record)
		});

		let event = CreateEvent {
			collection: collection.to_string(),
			auth,
		};
		match &self.create {
			Some(hooks) => hooks.on_create(event, next).await,
			None => next().await,
		}
	}

	pub async fn update(
		&self,
		collection: &str,
		id: &str,
		patch: Value,
		auth: Option<StoredRecord>,
	) -> HostResult<StoredRecord> {
		let existing = self.get(collection, id).ok_or_else(|| fail("not found"))?;

		let mut merged = existing.fields.fields().clone();
		if let Value::Object(patch) = patch {
			merged.extend(patch);
		}
		let updated = StoredRecord::new(collection, id, RecordSnapshot::new(merged));

		let records = Arc::clone(&self.records);
		let next = next_fn(move || async move {
			if rejects(&updated.fields) {
				return Err(fail("validation failed"));
			}
			records.lock().unwrap().insert(
				(updated.collection.clone(), updated.id.clone()),
				updated.fields.clone(),
			);
			Ok(updated)
		});

		let event = UpdateEvent { existing, auth };
		match &self.update {
			Some(hooks) => hooks.on_update(event, next).await,
			None => next().await,
		}
	}

	pub async fn delete(
		&self,
		collection: &str,
		id: &str,
		auth: Option<StoredRecord>,
	) -> HostResult<()> {
		let record = self.get(collection, id).ok_or_else(|| fail("not found"))?;

		let records = Arc::clone(&self.records);
		let key = (record.collection.clone(), record.id.clone());
		let locked = record.fields.get("locked") == Some(&Value::Bool(true));
		let next = next_fn(move || async move {
			if locked {
				return Err(fail("record is locked"));
			}
			records.lock().unwrap().remove(&key);
			Ok(())
		});

		let event = DeleteEvent { record, auth };
		match &self.delete {
			Some(hooks) => hooks.on_delete(event, next).await,
			None => next().await,
		}
	}

	/// Password login against records whose `email` or `username` matches.
	pub async fn authenticate(
		&self,
		collection: &str,
		identity: &str,
		password: &str,
	) -> HostResult<Option<StoredRecord>> {
		let records = Arc::clone(&self.records);
		let collection_name = collection.to_string();
		let login = identity.to_string();
		let password = password.to_string();

		let next = next_fn(move || async move {
			let records = records.lock().unwrap();
			let found = records.iter().find(|((c, _), fields)| {
				*c == collection_name
					&& (fields.get_str("email") == Some(login.as_str())
						|| fields.get_str("username") == Some(login.as_str()))
			});

			match found {
				Some(((c, id), fields))
					if fields.get_str("password") == Some(password.as_str()) =>
				{
					Ok(Some(StoredRecord::new(c.clone(), id.clone(), fields.clone())))
				}
				_ => Err(fail("invalid credentials")),
			}
		});

		let event = AuthEvent {
			collection: collection.to_string(),
			identity: identity.to_string(),
		};
		match &self.authenticate {
			Some(hooks) => hooks.on_authenticate(event, next).await,
			None => next().await,
		}
	}
}

/// A host with the audit trail installed over an in-memory audit store.
pub fn setup(
	config: &TrailguardConfig,
) -> (MemoryHost, Arc<MemoryAuditStore>, Arc<AuditRecorder>) {
	let mut host = MemoryHost::default();
	let store =
		Arc::new(MemoryAuditStore::new().with_target(config.audit.audit_collection.clone()));
	let recorder = install_audit_trail(&mut host, store.clone(), config);
	(host, store, recorder)
}
