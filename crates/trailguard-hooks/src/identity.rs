// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::host::StoredRecord;

/// Fields tried, in order, for a human-readable username.
const USERNAME_FIELDS: &[&str] = &["username", "full_name", "email"];

/// Who performed a mutation, as written to the audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
	pub username: String,
	/// Empty for anonymous requests.
	pub user_id: String,
}

impl Actor {
	pub fn anonymous(username: impl Into<String>) -> Self {
		Self {
			username: username.into(),
			user_id: String::new(),
		}
	}

	pub fn is_anonymous(&self) -> bool {
		self.user_id.is_empty()
	}
}

/// Resolve the acting identity from the request's auth record.
///
/// The username is the first non-empty string among `username`, `full_name`
/// and `email`, falling back to the record id.
pub fn resolve_actor(auth: Option<&StoredRecord>, anonymous_username: &str) -> Actor {
	let Some(record) = auth else {
		return Actor::anonymous(anonymous_username);
	};

	let username = USERNAME_FIELDS
		.iter()
		.find_map(|field| record.fields.get_str(field))
		.unwrap_or(&record.id);

	Actor {
		username: username.to_string(),
		user_id: record.id.clone(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn user(fields: serde_json::Value) -> StoredRecord {
		StoredRecord::from_json("users", "u1", fields).unwrap()
	}

	#[test]
	fn no_auth_is_anonymous() {
		let actor = resolve_actor(None, "guest");
		assert_eq!(actor, Actor::anonymous("guest"));
		assert!(actor.is_anonymous());
	}

	#[test]
	fn prefers_username() {
		let record = user(json!({"username": "alice", "full_name": "Alice A", "email": "a@x.io"}));
		let actor = resolve_actor(Some(&record), "guest");
		assert_eq!(actor.username, "alice");
		assert_eq!(actor.user_id, "u1");
		assert!(!actor.is_anonymous());
	}

	#[test]
	fn falls_back_through_full_name_and_email() {
		let record = user(json!({"username": "", "full_name": "Alice A", "email": "a@x.io"}));
		assert_eq!(resolve_actor(Some(&record), "guest").username, "Alice A");

		let record = user(json!({"email": "a@x.io"}));
		assert_eq!(resolve_actor(Some(&record), "guest").username, "a@x.io");
	}

	#[test]
	fn falls_back_to_id() {
		let record = user(json!({"username": null, "email": 42}));
		assert_eq!(resolve_actor(Some(&record), "guest").username, "u1");
	}
}
