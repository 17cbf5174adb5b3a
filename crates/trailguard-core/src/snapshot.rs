// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Record snapshots before and after sanitization.
//!
//! A [`RecordSnapshot`] is whatever the data store handed us and may hold
//! credentials. The only way to obtain a [`SanitizedSnapshot`] is through
//! [`crate::RedactionPolicy::sanitize`], which consumes the raw snapshot, so
//! nothing downstream of the redactor can see unredacted fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// One record's fields at one instant, as produced by the data store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSnapshot(Map<String, Value>);

impl RecordSnapshot {
	pub fn new(fields: Map<String, Value>) -> Self {
		Self(fields)
	}

	pub fn get(&self, field: &str) -> Option<&Value> {
		self.0.get(field)
	}

	/// Returns the field as a string if it is a non-empty JSON string.
	pub fn get_str(&self, field: &str) -> Option<&str> {
		self.0.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn fields(&self) -> &Map<String, Value> {
		&self.0
	}

	pub(crate) fn into_fields(self) -> Map<String, Value> {
		self.0
	}
}

impl From<Map<String, Value>> for RecordSnapshot {
	fn from(fields: Map<String, Value>) -> Self {
		Self(fields)
	}
}

impl TryFrom<Value> for RecordSnapshot {
	type Error = CoreError;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		match value {
			Value::Object(fields) => Ok(Self(fields)),
			Value::Null => Err(CoreError::NotAnObject("null")),
			Value::Bool(_) => Err(CoreError::NotAnObject("bool")),
			Value::Number(_) => Err(CoreError::NotAnObject("number")),
			Value::String(_) => Err(CoreError::NotAnObject("string")),
			Value::Array(_) => Err(CoreError::NotAnObject("array")),
		}
	}
}

impl FromIterator<(String, Value)> for RecordSnapshot {
	fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

/// A snapshot with every sensitive field replaced by the redaction marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SanitizedSnapshot(Map<String, Value>);

impl SanitizedSnapshot {
	pub(crate) fn new(fields: Map<String, Value>) -> Self {
		Self(fields)
	}

	pub fn get(&self, field: &str) -> Option<&Value> {
		self.0.get(field)
	}

	pub fn contains_field(&self, field: &str) -> bool {
		self.0.contains_key(field)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn fields(&self) -> &Map<String, Value> {
		&self.0
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.0.iter()
	}

	pub fn to_value(&self) -> Value {
		Value::Object(self.0.clone())
	}
}

/// Sanitized data is still a valid record; re-sanitizing it is a no-op.
impl From<SanitizedSnapshot> for RecordSnapshot {
	fn from(snapshot: SanitizedSnapshot) -> Self {
		Self(snapshot.0)
	}
}
