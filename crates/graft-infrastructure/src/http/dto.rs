//! Wire formats of the Grafana folder, search and dashboard endpoints.

use graft_core::model::{Dashboard, DashboardSummary, Folder, FolderId, ImportReceipt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entry of `GET /api/folders`, also the body of `POST /api/folders` and
/// `GET /api/folders/{uid}` responses.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderDto {
    pub id: i64,
    #[serde(default)]
    pub uid: Option<String>,
    pub title: String,
}

impl From<FolderDto> for Folder {
    fn from(dto: FolderDto) -> Self {
        Folder {
            id: FolderId(dto.id),
            uid: dto.uid.filter(|uid| !uid.is_empty()),
            title: dto.title,
        }
    }
}

/// Entry of `GET /api/search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHitDto {
    pub uid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub folder_id: Option<i64>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl SearchHitDto {
    pub fn is_dashboard(&self) -> bool {
        self.kind.as_deref().is_none_or(|kind| kind == "dash-db")
    }
}

impl From<SearchHitDto> for DashboardSummary {
    fn from(dto: SearchHitDto) -> Self {
        DashboardSummary {
            uid: dto.uid,
            title: dto.title,
            folder_id: dto.folder_id.map(FolderId),
        }
    }
}

/// Body of `GET /api/dashboards/uid/{uid}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardExportDto {
    pub dashboard: Value,
    #[serde(default)]
    pub meta: Value,
}

impl DashboardExportDto {
    pub fn into_dashboard(self, requested_uid: &str) -> Dashboard {
        Dashboard::from_export(requested_uid, self.dashboard, self.meta)
    }
}

/// Body of `POST /api/folders`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateFolderRequest<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<&'a str>,
}

impl<'a> From<&'a Folder> for CreateFolderRequest<'a> {
    fn from(folder: &'a Folder) -> Self {
        Self {
            title: &folder.title,
            uid: folder.uid.as_deref(),
        }
    }
}

/// Body of `POST /api/dashboards/db`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDashboardRequest<'a> {
    pub dashboard: &'a Value,
    pub overwrite: bool,
    pub folder_id: i64,
    pub message: &'a str,
}

/// Response of `POST /api/dashboards/db`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportDashboardResponse {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ImportDashboardResponse {
    pub fn into_receipt(self, requested_uid: &str) -> ImportReceipt {
        ImportReceipt {
            uid: self.uid.unwrap_or_else(|| requested_uid.to_string()),
            url: self.url,
            version: self.version,
            status: self.status,
        }
    }
}
