//! Structured per-resource outcome events.
//!
//! Every [`MigrationResult`] is emitted exactly once as a `tracing` event
//! with target [`MIGRATION_EVENT_TARGET`]. Subscribers pick them up either
//! through a regular `fmt` layer or through
//! [`MigrationEventLayer`](crate::tracing_layer::MigrationEventLayer).

use graft_core::report::{MigrationResult, Outcome};

/// `tracing` target of outcome events.
pub const MIGRATION_EVENT_TARGET: &str = "graft::migration";

/// Name of the span wrapping one migration run.
pub const RUN_SPAN_NAME: &str = "migration_run";

/// Emits one outcome event for `result`.
pub fn emit(result: &MigrationResult) {
    let resource_kind = result.resource_kind.as_ref();
    let target_id = result.target_identifier.as_deref().unwrap_or("");

    match result.outcome {
        Outcome::Success => tracing::info!(
            target: MIGRATION_EVENT_TARGET,
            resource_kind,
            source_id = %result.source_identifier,
            target_id,
            outcome = result.outcome.as_ref(),
            detail = %result.detail,
            "{} {} migrated",
            resource_kind,
            result.source_identifier
        ),
        Outcome::Failed => tracing::warn!(
            target: MIGRATION_EVENT_TARGET,
            resource_kind,
            source_id = %result.source_identifier,
            target_id,
            outcome = result.outcome.as_ref(),
            detail = %result.detail,
            "{} {} failed",
            resource_kind,
            result.source_identifier
        ),
    }
}
