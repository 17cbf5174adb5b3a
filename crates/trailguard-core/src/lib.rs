// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Capture primitives for the trailguard audit trail.
//!
//! This crate holds the pure, synchronous half of audit capture:
//! - [`RedactionPolicy`] turns a raw [`RecordSnapshot`] into a [`SanitizedSnapshot`]
//! - [`digest`] computes an [`IntegrityHash`] over sanitized data
//! - [`diff`] computes a [`ChangeSet`] between two sanitized snapshots
//! - [`SeverityPolicy`] assigns an [`AuditSeverity`] to an action

pub mod action;
pub mod diff;
pub mod error;
pub mod hash;
pub mod redact;
pub mod severity;
pub mod snapshot;

pub use action::AuditAction;
pub use diff::{diff, values_equivalent, ChangeSet, FieldChange};
pub use error::CoreError;
pub use hash::{digest, digest_value, verify, IntegrityHash};
pub use redact::{sanitize, RedactionPolicy};
pub use severity::{AuditSeverity, SeverityPolicy};
pub use snapshot::{RecordSnapshot, SanitizedSnapshot};
