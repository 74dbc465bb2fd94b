//! Dashboard domain models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::folder::FolderId;

/// Search hit for a dashboard, without its panel document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub uid: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<FolderId>,
}

impl DashboardSummary {
    pub fn new(uid: impl Into<String>, title: impl Into<String>, folder_id: Option<FolderId>) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            folder_id,
        }
    }
}

/// A fully exported dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub uid: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<FolderId>,
    /// The `dashboard` document: panels, queries, templating.
    pub payload: Value,
    /// Export metadata returned next to the document. Never imported.
    #[serde(default)]
    pub meta: Value,
}

impl Dashboard {
    /// Builds a dashboard from an export document, reading uid and title from it.
    ///
    /// `fallback_uid` is used when the document carries no uid of its own.
    pub fn from_export(fallback_uid: &str, payload: Value, meta: Value) -> Self {
        let uid = payload
            .get("uid")
            .and_then(Value::as_str)
            .filter(|uid| !uid.is_empty())
            .unwrap_or(fallback_uid)
            .to_string();
        let title = payload
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let folder_id = meta
            .get("folderId")
            .and_then(Value::as_i64)
            .map(FolderId);

        Self {
            uid,
            title,
            folder_id,
            payload,
            meta,
        }
    }

    /// Returns a top-level field of the dashboard document.
    pub fn payload_field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// The `{dashboard, meta}` envelope Grafana uses for exports.
    pub fn export_document(&self) -> Value {
        serde_json::json!({
            "dashboard": self.payload,
            "meta": self.meta,
        })
    }
}

/// Target acknowledgement of a dashboard import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ImportReceipt {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
