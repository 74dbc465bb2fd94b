//! Audit trail for exported dashboards.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Dashboard;

/// Persists exported dashboards keyed by uid.
///
/// Purely an audit trail: a failing sink is logged by the caller and never
/// changes the outcome of a migration.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn store(&self, dashboard: &Dashboard) -> Result<()>;
}
