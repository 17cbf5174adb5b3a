// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Field-level change sets between two sanitized snapshots.
//!
//! Comparison is lenient across representations: a store that round-trips
//! `1` as `"1"` or `true` as `"true"` does not produce a spurious change.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Number, Value};

use crate::snapshot::SanitizedSnapshot;

/// Before and after values of one field. A side is `None` when the field is
/// absent from that snapshot; it serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
	pub old: Option<Value>,
	pub new: Option<Value>,
}

/// Changed fields keyed by name, in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet(BTreeMap<String, FieldChange>);

impl ChangeSet {
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn get(&self, field: &str) -> Option<&FieldChange> {
		self.0.get(field)
	}

	pub fn contains_field(&self, field: &str) -> bool {
		self.0.contains_key(field)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldChange)> {
		self.0.iter()
	}

	pub fn to_value(&self) -> Value {
		let map = self
			.0
			.iter()
			.map(|(field, change)| {
				let mut pair = serde_json::Map::with_capacity(2);
				pair.insert("old".to_string(), change.old.clone().unwrap_or(Value::Null));
				pair.insert("new".to_string(), change.new.clone().unwrap_or(Value::Null));
				(field.clone(), Value::Object(pair))
			})
			.collect();
		Value::Object(map)
	}
}

/// Compute the fields whose values differ between `old` and `new`.
///
/// Fields present on only one side are reported with the missing side as
/// `None`. Fields present on both sides with equivalent values are omitted.
pub fn diff(old: &SanitizedSnapshot, new: &SanitizedSnapshot) -> ChangeSet {
	let mut changes = BTreeMap::new();

	for (field, old_value) in old.iter() {
		match new.get(field) {
			Some(new_value) if values_equivalent(old_value, new_value) => {}
			new_value => {
				changes.insert(
					field.clone(),
					FieldChange {
						old: Some(old_value.clone()),
						new: new_value.cloned(),
					},
				);
			}
		}
	}

	for (field, new_value) in new.iter() {
		if !old.contains_field(field) {
			changes.insert(
				field.clone(),
				FieldChange {
					old: None,
					new: Some(new_value.clone()),
				},
			);
		}
	}

	ChangeSet(changes)
}

/// Representation-tolerant equality used by [`diff`].
///
/// - numbers compare by numeric value (`1 == 1.0`)
/// - a number equals a string that parses to the same finite number
/// - a bool equals its literal string (`true == "true"`)
/// - arrays and objects compare element-wise and key-wise, recursively
/// - `null` equals only `null`
pub fn values_equivalent(a: &Value, b: &Value) -> bool {
	match (a, b) {
		(Value::Null, Value::Null) => true,
		(Value::Bool(x), Value::Bool(y)) => x == y,
		(Value::String(x), Value::String(y)) => x == y,
		(Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
		(Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
			number_matches_text(n, s)
		}
		(Value::Bool(flag), Value::String(s)) | (Value::String(s), Value::Bool(flag)) => {
			s == if *flag { "true" } else { "false" }
		}
		(Value::Array(x), Value::Array(y)) => {
			x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equivalent(l, r))
		}
		(Value::Object(x), Value::Object(y)) => {
			x.len() == y.len()
				&& x
					.iter()
					.all(|(key, l)| y.get(key).is_some_and(|r| values_equivalent(l, r)))
		}
		_ => false,
	}
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
	if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
		return x == y;
	}
	if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
		return x == y;
	}
	match (a.as_f64(), b.as_f64()) {
		(Some(x), Some(y)) => x == y,
		_ => false,
	}
}

fn number_matches_text(n: &Number, text: &str) -> bool {
	if let Ok(parsed) = text.parse::<i64>() {
		return n.as_i64() == Some(parsed) || n.as_f64() == Some(parsed as f64);
	}
	if let Ok(parsed) = text.parse::<u64>() {
		return n.as_u64() == Some(parsed);
	}
	match text.parse::<f64>() {
		Ok(parsed) if parsed.is_finite() => n.as_f64() == Some(parsed),
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::redact::sanitize;
	use crate::snapshot::RecordSnapshot;
	use serde_json::json;

	fn sanitized(value: Value) -> SanitizedSnapshot {
		sanitize(RecordSnapshot::try_from(value).unwrap(), "posts")
	}

	#[test]
	fn identical_snapshots_have_no_changes() {
		let a = sanitized(json!({"title": "x", "count": 3}));
		assert!(diff(&a, &a.clone()).is_empty());
	}

	#[test]
	fn reports_changed_field_with_both_sides() {
		let old = sanitized(json!({"status": "draft", "title": "x"}));
		let new = sanitized(json!({"status": "published", "title": "x"}));
		let changes = diff(&old, &new);

		assert_eq!(changes.len(), 1);
		assert_eq!(
			changes.to_value(),
			json!({"status": {"old": "draft", "new": "published"}})
		);
	}

	#[test]
	fn reports_added_and_removed_fields() {
		let old = sanitized(json!({"legacy": 1}));
		let new = sanitized(json!({"fresh": 2}));
		let changes = diff(&old, &new);

		assert_eq!(
			changes.get("legacy"),
			Some(&FieldChange {
				old: Some(json!(1)),
				new: None
			})
		);
		assert_eq!(
			changes.get("fresh"),
			Some(&FieldChange {
				old: None,
				new: Some(json!(2))
			})
		);
		assert_eq!(
			serde_json::to_value(&changes).unwrap(),
			json!({
				"fresh": {"old": null, "new": 2},
				"legacy": {"old": 1, "new": null}
			})
		);
	}

	#[test]
	fn null_and_missing_are_different() {
		let old = sanitized(json!({"note": null}));
		let new = sanitized(json!({}));
		assert!(diff(&old, &new).contains_field("note"));
	}

	#[test]
	fn representation_changes_are_not_reported() {
		let old = sanitized(json!({"count": 1, "ratio": 0.5, "flag": true, "id": 7}));
		let new = sanitized(json!({"count": "1", "ratio": "0.5", "flag": "true", "id": 7.0}));
		assert!(diff(&old, &new).is_empty());
	}

	#[test]
	fn redacted_fields_never_show_as_changed() {
		let old = sanitize(
			RecordSnapshot::try_from(json!({"password": "old-secret"})).unwrap(),
			"users",
		);
		let new = sanitize(
			RecordSnapshot::try_from(json!({"password": "new-secret"})).unwrap(),
			"users",
		);
		assert!(diff(&old, &new).is_empty());
	}

	#[test]
	fn keys_are_sorted() {
		let old = sanitized(json!({}));
		let new = sanitized(json!({"b": 1, "a": 2, "c": 3}));
		let changes = diff(&old, &new);
		let keys: Vec<&str> = changes.keys().collect();
		assert_eq!(keys, vec!["a", "b", "c"]);
	}

	mod equivalence {
		use super::*;

		#[test]
		fn numbers() {
			assert!(values_equivalent(&json!(1), &json!(1.0)));
			assert!(values_equivalent(&json!(u64::MAX), &json!(u64::MAX)));
			assert!(!values_equivalent(&json!(1), &json!(2)));
		}

		#[test]
		fn numbers_and_strings() {
			assert!(values_equivalent(&json!(42), &json!("42")));
			assert!(values_equivalent(&json!("2.5"), &json!(2.5)));
			assert!(!values_equivalent(&json!(42), &json!("42abc")));
			assert!(!values_equivalent(&json!(1), &json!("NaN")));
			assert!(!values_equivalent(&json!(1), &json!("")));
		}

		#[test]
		fn padded_text_is_not_a_number() {
			assert!(!values_equivalent(&json!(1), &json!(" 1")));
			assert!(!values_equivalent(&json!("1 "), &json!(1)));
			let changes = diff(&sanitized(json!({"n": 1})), &sanitized(json!({"n": " 1"})));
			assert!(changes.contains_field("n"));
		}

		#[test]
		fn bools_and_strings() {
			assert!(values_equivalent(&json!(true), &json!("true")));
			assert!(values_equivalent(&json!("false"), &json!(false)));
			assert!(!values_equivalent(&json!(true), &json!("TRUE")));
			assert!(!values_equivalent(&json!(true), &json!(1)));
		}

		#[test]
		fn null_only_equals_null() {
			assert!(values_equivalent(&Value::Null, &Value::Null));
			assert!(!values_equivalent(&Value::Null, &json!("")));
			assert!(!values_equivalent(&Value::Null, &json!(0)));
			assert!(!values_equivalent(&Value::Null, &json!(false)));
		}

		#[test]
		fn nested_structures() {
			assert!(values_equivalent(
				&json!({"tags": [1, "two"], "meta": {"n": 3}}),
				&json!({"meta": {"n": "3"}, "tags": ["1", "two"]})
			));
			assert!(!values_equivalent(&json!([1, 2]), &json!([1, 2, 3])));
			assert!(!values_equivalent(&json!({"a": 1}), &json!({"b": 1})));
		}
	}
}

#[cfg(test)]
mod proptests {
	use super::*;
	use crate::redact::sanitize;
	use crate::snapshot::RecordSnapshot;
	use proptest::prelude::*;
	use std::collections::BTreeSet;

	fn arb_value() -> impl Strategy<Value = Value> {
		prop_oneof![
			Just(Value::Null),
			any::<bool>().prop_map(Value::Bool),
			any::<i32>().prop_map(Value::from),
			"[a-z0-9]{0,6}".prop_map(Value::String),
		]
	}

	fn arb_snapshot() -> impl Strategy<Value = SanitizedSnapshot> {
		proptest::collection::btree_map("[a-e]", arb_value(), 0..5).prop_map(|m| {
			sanitize(m.into_iter().collect::<RecordSnapshot>(), "posts")
		})
	}

	proptest! {
		#[test]
		fn diff_with_self_is_empty(snapshot in arb_snapshot()) {
			prop_assert!(diff(&snapshot, &snapshot).is_empty());
		}

		#[test]
		fn changed_keys_come_from_either_side(old in arb_snapshot(), new in arb_snapshot()) {
			let union: BTreeSet<&str> = old
				.fields()
				.keys()
				.chain(new.fields().keys())
				.map(String::as_str)
				.collect();
			for key in diff(&old, &new).keys() {
				prop_assert!(union.contains(key));
			}
		}

		#[test]
		fn reported_changes_are_real(old in arb_snapshot(), new in arb_snapshot()) {
			for (field, change) in diff(&old, &new).iter() {
				match (&change.old, &change.new) {
					(Some(l), Some(r)) => prop_assert!(!values_equivalent(l, r), "{field}"),
					(None, None) => prop_assert!(false, "{field} has no sides"),
					_ => {}
				}
			}
		}

		#[test]
		fn equivalence_is_symmetric(a in arb_value(), b in arb_value()) {
			prop_assert_eq!(values_equivalent(&a, &b), values_equivalent(&b, &a));
		}
	}
}
