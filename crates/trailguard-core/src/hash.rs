// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Integrity hashing of sanitized snapshots.
//!
//! The digest is SHA-256 over a canonical JSON encoding: compact, with object
//! keys sorted at every nesting level. Two snapshots with the same contents
//! hash identically no matter how their maps were built.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::snapshot::SanitizedSnapshot;

/// Hex-encoded SHA-256 digest of a sanitized snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegrityHash(String);

impl IntegrityHash {
	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_inner(self) -> String {
		self.0
	}
}

impl fmt::Display for IntegrityHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

struct Canonical<'a>(&'a Value);

impl Serialize for Canonical<'_> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self.0 {
			Value::Object(map) => {
				let mut entries: Vec<(&String, &Value)> = map.iter().collect();
				entries.sort_by(|a, b| a.0.cmp(b.0));

				let mut out = serializer.serialize_map(Some(entries.len()))?;
				for (key, value) in entries {
					out.serialize_entry(key, &Canonical(value))?;
				}
				out.end()
			}
			Value::Array(items) => {
				let mut out = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					out.serialize_element(&Canonical(item))?;
				}
				out.end()
			}
			scalar => scalar.serialize(serializer),
		}
	}
}

/// Canonical byte encoding used as hash input.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
	serde_json::to_vec(&Canonical(value))
}

/// Digest an arbitrary JSON value. Returns `None` if it cannot be encoded.
pub fn digest_value(value: &Value) -> Option<IntegrityHash> {
	match canonical_bytes(value) {
		Ok(bytes) => Some(IntegrityHash(hex::encode(Sha256::digest(&bytes)))),
		Err(e) => {
			warn!(error = %e, "failed to canonicalize snapshot, continuing without integrity hash");
			None
		}
	}
}

/// Digest a sanitized snapshot.
///
/// Fails closed: an encoding failure yields `None` and the audit proceeds
/// without integrity data.
pub fn digest(snapshot: &SanitizedSnapshot) -> Option<IntegrityHash> {
	digest_value(&snapshot.to_value())
}

/// Recompute the digest of `snapshot` and compare it with a stored hex hash.
pub fn verify(snapshot: &SanitizedSnapshot, expected: &str) -> bool {
	digest(snapshot).is_some_and(|actual| actual.as_str().eq_ignore_ascii_case(expected))
}
