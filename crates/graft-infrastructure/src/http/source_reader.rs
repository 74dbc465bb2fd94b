//! Source-side Grafana reader over HTTP.

use async_trait::async_trait;

use graft_core::config::{EndpointConfig, MigrationSettings};
use graft_core::error::{GraftError, Result};
use graft_core::model::{Dashboard, DashboardSummary, Folder, FolderId};
use graft_core::source::SourceReader;

use super::client::GrafanaClient;
use super::dto::{DashboardExportDto, FolderDto, SearchHitDto};

/// Reads folders and dashboards from a Grafana instance.
pub struct HttpSourceReader {
    client: GrafanaClient,
    page_size: usize,
}

impl HttpSourceReader {
    pub fn new(endpoint: &EndpointConfig, settings: &MigrationSettings) -> Result<Self> {
        Ok(Self {
            client: GrafanaClient::new(endpoint, settings)?,
            page_size: settings.page_size,
        })
    }
}

#[async_trait]
impl SourceReader for HttpSourceReader {
    async fn list_folders(&self) -> Result<Vec<Folder>> {
        tracing::debug!(url = %self.client.api_url("folders"), "Listing source folders");

        let folders: Vec<FolderDto> = self
            .client
            .get_paged("folders", &[], self.page_size)
            .await
            .map_err(|failure| {
                GraftError::source_unavailable(format!("GET /api/folders: {}", failure))
            })?;

        Ok(folders.into_iter().map(Folder::from).collect())
    }

    async fn list_dashboards(&self, folder_id: FolderId) -> Result<Vec<DashboardSummary>> {
        let query = [
            ("folderIds", folder_id.to_string()),
            ("type", "dash-db".to_string()),
        ];

        let hits: Vec<SearchHitDto> = self
            .client
            .get_paged("search", &query, self.page_size)
            .await
            .map_err(|failure| GraftError::list_dashboards_failed(folder_id, failure.to_string()))?;

        Ok(hits
            .into_iter()
            .filter(SearchHitDto::is_dashboard)
            .map(DashboardSummary::from)
            .collect())
    }

    async fn export_dashboard(&self, uid: &str) -> Result<Dashboard> {
        let export: DashboardExportDto = self
            .client
            .get_json(&format!("dashboards/uid/{}", uid), &[])
            .await
            .map_err(|failure| GraftError::export_failed(uid, failure.to_string()))?;

        if !export.dashboard.is_object() {
            return Err(GraftError::export_failed(
                uid,
                "response did not contain a dashboard document",
            ));
        }

        Ok(export.into_dashboard(uid))
    }
}
