// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit-trail capture for data-store hosts.
//!
//! A host implements [`LifecycleHost`] and calls back through
//! [`MutationHooks`]. [`install_audit_trail`] wires an [`AuditInterceptor`]
//! backed by an [`AuditRecorder`] into it:
//!
//! ```ignore
//! let config = trailguard_config::load_config()?;
//! trailguard_hooks::telemetry::init_tracing(&config.logging)?;
//!
//! let store = Arc::new(SqliteAuditStore::new(pool));
//! let recorder = install_audit_trail(&mut host, store, &config);
//! // ... serve requests ...
//! recorder.shutdown().await;
//! ```

pub mod host;
pub mod identity;
pub mod interceptor;
pub mod register;
pub mod telemetry;

pub use host::{
	next_fn, AuthEvent, CreateEvent, DeleteEvent, HostError, HostResult, LifecycleHost,
	MutationHooks, Next, StoredRecord, UpdateEvent,
};
pub use identity::{resolve_actor, Actor};
pub use interceptor::{AuditInterceptor, PreImage};
pub use register::{install_audit_trail, register_audit_hooks};
pub use trailguard_recorder::{AuditRecorder, AuditStore};
