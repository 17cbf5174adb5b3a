// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The lifecycle operation an audit entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
	Create,
	Update,
	Delete,
	Login,
}

impl AuditAction {
	pub fn as_str(&self) -> &'static str {
		match self {
			AuditAction::Create => "create",
			AuditAction::Update => "update",
			AuditAction::Delete => "delete",
			AuditAction::Login => "login",
		}
	}

	pub fn all() -> &'static [AuditAction] {
		&[
			AuditAction::Create,
			AuditAction::Update,
			AuditAction::Delete,
			AuditAction::Login,
		]
	}
}

impl fmt::Display for AuditAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for AuditAction {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"create" => Ok(AuditAction::Create),
			"update" => Ok(AuditAction::Update),
			"delete" => Ok(AuditAction::Delete),
			"login" => Ok(AuditAction::Login),
			_ => Err(CoreError::InvalidAction(s.to_string())),
		}
	}
}
