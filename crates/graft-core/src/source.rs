//! Read-only access to the instance being migrated from.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Dashboard, DashboardSummary, Folder, FolderId};

/// Reads folders and dashboards from a source instance.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Lists every folder visible to the configured credential.
    ///
    /// # Errors
    /// `GraftError::SourceUnavailable` when the instance cannot be reached or
    /// answers with a non-success status. The orchestrator treats this as
    /// fatal.
    async fn list_folders(&self) -> Result<Vec<Folder>>;

    /// Lists dashboard summaries in one folder. An empty folder yields an
    /// empty vector.
    async fn list_dashboards(&self, folder_id: FolderId) -> Result<Vec<DashboardSummary>>;

    /// Fetches the full document of one dashboard.
    ///
    /// # Errors
    /// `GraftError::DashboardExportFailed` on any non-success response.
    async fn export_dashboard(&self, uid: &str) -> Result<Dashboard>;
}
