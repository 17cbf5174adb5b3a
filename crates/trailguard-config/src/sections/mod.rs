// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod audit;
mod logging;
mod redaction;
mod severity;

pub use audit::{AuditConfig, AuditConfigLayer, QueueOverflowPolicy};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use redaction::{RedactionConfig, RedactionConfigLayer, DEFAULT_REDACTION_MARKER};
pub use severity::{SeverityConfig, SeverityConfigLayer, SEVERITY_TIERS};
