// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use tracing::info;
use trailguard_config::TrailguardConfig;
use trailguard_recorder::{AuditRecorder, AuditStore};

use crate::host::{LifecycleHost, MutationHooks};
use crate::interceptor::AuditInterceptor;

/// Attach `interceptor` to every lifecycle the host exposes.
pub fn register_audit_hooks<H>(host: &mut H, interceptor: Arc<AuditInterceptor>)
where
	H: LifecycleHost + ?Sized,
{
	let hooks: Arc<dyn MutationHooks> = interceptor;

	host.bind_create(Arc::clone(&hooks));
	host.bind_update(Arc::clone(&hooks));
	host.bind_delete(Arc::clone(&hooks));
	host.bind_authenticate(hooks);

	info!("audit hooks registered");
}

/// Build a recorder over `store`, wrap it in an interceptor configured from
/// `config` and register it with `host`.
///
/// Returns the recorder so the host can call [`AuditRecorder::shutdown`] on
/// graceful stop. Must be called from within a Tokio runtime.
pub fn install_audit_trail<H>(
	host: &mut H,
	store: Arc<dyn AuditStore>,
	config: &TrailguardConfig,
) -> Arc<AuditRecorder>
where
	H: LifecycleHost + ?Sized,
{
	let recorder = Arc::new(AuditRecorder::new(store, &config.audit));
	let interceptor = Arc::new(AuditInterceptor::new(Arc::clone(&recorder), config));
	register_audit_hooks(host, interceptor);

	info!(
		target_collection = %config.audit.audit_collection,
		enabled = config.audit.enabled,
		excluded = config.audit.excluded_collections.len(),
		"audit trail installed"
	);

	recorder
}

#[cfg(test)]
mod tests {
	use super::*;
	use trailguard_recorder::MemoryAuditStore;

	#[derive(Default)]
	struct CountingHost {
		create: usize,
		update: usize,
		delete: usize,
		authenticate: usize,
	}

	impl LifecycleHost for CountingHost {
		fn bind_create(&mut self, _hooks: Arc<dyn MutationHooks>) {
			self.create += 1;
		}

		fn bind_update(&mut self, _hooks: Arc<dyn MutationHooks>) {
			self.update += 1;
		}

		fn bind_delete(&mut self, _hooks: Arc<dyn MutationHooks>) {
			self.delete += 1;
		}

		fn bind_authenticate(&mut self, _hooks: Arc<dyn MutationHooks>) {
			self.authenticate += 1;
		}
	}

	#[tokio::test]
	async fn binds_every_lifecycle_once() {
		let mut host = CountingHost::default();
		let store = Arc::new(MemoryAuditStore::new().with_target("audit_logs"));

		let recorder = install_audit_trail(&mut host, store, &TrailguardConfig::default());

		assert_eq!(
			(host.create, host.update, host.delete, host.authenticate),
			(1, 1, 1, 1)
		);
		assert!(recorder.is_enabled());
		recorder.shutdown().await;
	}
}
