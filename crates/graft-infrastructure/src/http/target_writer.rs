//! Target-side Grafana writer over HTTP.

use async_trait::async_trait;
use reqwest::StatusCode;

use graft_core::config::{EndpointConfig, MigrationSettings};
use graft_core::error::{GraftError, Result};
use graft_core::model::{Dashboard, Folder, FolderId, ImportReceipt};
use graft_core::target::TargetWriter;

use super::client::{GrafanaClient, HttpFailure};
use super::dto::{CreateFolderRequest, FolderDto, ImportDashboardRequest, ImportDashboardResponse};

/// Creates folders and imports dashboards on a Grafana instance.
pub struct HttpTargetWriter {
    client: GrafanaClient,
    import_message: String,
}

impl HttpTargetWriter {
    pub fn new(endpoint: &EndpointConfig, settings: &MigrationSettings) -> Result<Self> {
        Ok(Self {
            client: GrafanaClient::new(endpoint, settings)?,
            import_message: settings.import_message.clone(),
        })
    }

    /// Id of the existing target folder with `uid`.
    async fn lookup_folder(&self, uid: &str) -> std::result::Result<FolderId, HttpFailure> {
        let existing: FolderDto = self
            .client
            .get_json(&format!("folders/{}", uid), &[])
            .await?;
        Ok(FolderId(existing.id))
    }
}

/// Statuses Grafana answers with when a folder with the same uid or title
/// already exists.
pub(crate) fn is_folder_conflict(failure: &HttpFailure) -> bool {
    matches!(
        failure.status(),
        Some(StatusCode::CONFLICT) | Some(StatusCode::PRECONDITION_FAILED)
    )
}

#[async_trait]
impl TargetWriter for HttpTargetWriter {
    async fn create_folder(&self, folder: &Folder) -> Result<FolderId> {
        let request = CreateFolderRequest::from(folder);

        match self
            .client
            .post_json::<_, FolderDto>("folders", &request)
            .await
        {
            Ok(created) => Ok(FolderId(created.id)),
            Err(failure) if is_folder_conflict(&failure) => {
                let Some(uid) = folder.uid.as_deref() else {
                    return Err(GraftError::folder_create_failed(
                        &folder.title,
                        format!("{} (folder has no uid to reconcile with)", failure),
                    ));
                };

                tracing::debug!(uid, "Folder already exists on target, reusing it");
                self.lookup_folder(uid).await.map_err(|lookup| {
                    GraftError::folder_create_failed(
                        &folder.title,
                        format!("{}; lookup of existing folder failed: {}", failure, lookup),
                    )
                })
            }
            Err(failure) => Err(GraftError::folder_create_failed(
                &folder.title,
                failure.to_string(),
            )),
        }
    }

    async fn import_dashboard(
        &self,
        dashboard: &Dashboard,
        folder_id: FolderId,
    ) -> Result<ImportReceipt> {
        let request = ImportDashboardRequest {
            dashboard: &dashboard.payload,
            overwrite: true,
            folder_id: folder_id.0,
            message: &self.import_message,
        };

        let response: ImportDashboardResponse = self
            .client
            .post_json("dashboards/db", &request)
            .await
            .map_err(|failure| GraftError::import_failed(&dashboard.uid, failure.to_string()))?;

        Ok(response.into_receipt(&dashboard.uid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_statuses_are_reconciled() {
        let conflict = HttpFailure::Status {
            status: StatusCode::CONFLICT,
            message: "a folder with the same uid already exists".to_string(),
        };
        let precondition = HttpFailure::Status {
            status: StatusCode::PRECONDITION_FAILED,
            message: "version mismatch".to_string(),
        };
        let server_error = HttpFailure::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".to_string(),
        };
        let transport = HttpFailure::Transport {
            message: "connection refused".to_string(),
        };

        assert!(is_folder_conflict(&conflict));
        assert!(is_folder_conflict(&precondition));
        assert!(!is_folder_conflict(&server_error));
        assert!(!is_folder_conflict(&transport));
    }
}
