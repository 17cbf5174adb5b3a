// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit entry recording for trailguard.
//!
//! The [`AuditRecorder`] accepts [`AuditEntryDraft`]s from the capture path,
//! assigns ids and persists them through an [`AuditStore`] in the background.
//!
//! # Stores
//!
//! - `memory`: in-process, for embedding and tests
//! - `sqlite`: one row per entry in a SQLite table (feature `store-sqlite`)
//! - `jsonl`: append-only JSON-lines files (feature `store-file`)

pub mod entry;
pub mod error;
mod queue;
pub mod recorder;
pub mod store;

pub use entry::{AuditEntry, AuditEntryDraft, AuditEntryDraftBuilder};
pub use error::{AuditStoreError, StoreResult};
pub use recorder::{AuditRecorder, RecordOutcome};
pub use store::{AuditStore, AuditTarget, MemoryAuditStore};

#[cfg(feature = "store-file")]
pub use store::JsonLinesAuditStore;
#[cfg(feature = "store-sqlite")]
pub use store::SqliteAuditStore;

pub use trailguard_config::QueueOverflowPolicy;
