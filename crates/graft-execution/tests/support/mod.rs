//! In-memory Grafana instances for orchestrator tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use graft_core::artifact::ArtifactSink;
use graft_core::error::{GraftError, Result};
use graft_core::model::{Dashboard, DashboardSummary, Folder, FolderId, ImportReceipt};
use graft_core::source::SourceReader;
use graft_core::target::TargetWriter;

/// Source instance with canned folders and dashboards.
#[derive(Default)]
pub struct FakeSource {
    pub folders: Vec<Folder>,
    pub unavailable: bool,
    pub dashboards: HashMap<FolderId, Vec<DashboardSummary>>,
    pub exports: HashMap<String, Dashboard>,
    pub failing_exports: HashSet<String>,
    pub failing_listings: HashSet<FolderId>,
    pub listed_folders: Mutex<Vec<FolderId>>,
}

impl FakeSource {
    pub fn new(folders: Vec<Folder>) -> Self {
        Self {
            folders,
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Adds a dashboard with a source-assigned id and version.
    pub fn with_dashboard(mut self, folder_id: i64, uid: &str) -> Self {
        let folder_id = FolderId(folder_id);
        self.dashboards
            .entry(folder_id)
            .or_default()
            .push(DashboardSummary::new(uid, format!("Dashboard {uid}"), Some(folder_id)));
        self.exports.insert(
            uid.to_string(),
            Dashboard::from_export(
                uid,
                json!({
                    "id": 100 + self.exports.len() as i64,
                    "uid": uid,
                    "title": format!("Dashboard {uid}"),
                    "version": 3,
                    "panels": [{"id": 1, "type": "timeseries"}]
                }),
                json!({"folderId": folder_id.0}),
            ),
        );
        self
    }

    pub fn with_raw_export(mut self, folder_id: i64, uid: &str, payload: Value) -> Self {
        let folder_id = FolderId(folder_id);
        self.dashboards
            .entry(folder_id)
            .or_default()
            .push(DashboardSummary::new(uid, uid, Some(folder_id)));
        self.exports
            .insert(uid.to_string(), Dashboard::from_export(uid, payload, Value::Null));
        self
    }

    pub fn failing_export(mut self, uid: &str) -> Self {
        self.failing_exports.insert(uid.to_string());
        self
    }

    pub fn failing_listing(mut self, folder_id: i64) -> Self {
        self.failing_listings.insert(FolderId(folder_id));
        self
    }
}

#[async_trait]
impl SourceReader for FakeSource {
    async fn list_folders(&self) -> Result<Vec<Folder>> {
        if self.unavailable {
            return Err(GraftError::source_unavailable("connection refused"));
        }
        Ok(self.folders.clone())
    }

    async fn list_dashboards(&self, folder_id: FolderId) -> Result<Vec<DashboardSummary>> {
        self.listed_folders.lock().unwrap().push(folder_id);
        if self.failing_listings.contains(&folder_id) {
            return Err(GraftError::list_dashboards_failed(folder_id, "HTTP 502: bad gateway"));
        }
        Ok(self.dashboards.get(&folder_id).cloned().unwrap_or_default())
    }

    async fn export_dashboard(&self, uid: &str) -> Result<Dashboard> {
        if self.failing_exports.contains(uid) {
            return Err(GraftError::export_failed(uid, "HTTP 404: Dashboard not found"));
        }
        self.exports
            .get(uid)
            .cloned()
            .ok_or_else(|| GraftError::export_failed(uid, "HTTP 404: Dashboard not found"))
    }
}

/// A dashboard as stored by [`FakeTarget`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDashboard {
    pub folder_id: FolderId,
    pub payload: Value,
}

#[derive(Debug, Default)]
struct TargetState {
    next_id: i64,
    folders_by_uid: BTreeMap<String, FolderId>,
    dashboards: BTreeMap<String, StoredDashboard>,
    create_calls: Vec<String>,
    import_calls: Vec<(String, FolderId)>,
    imports_into_unknown_folder: Vec<String>,
}

/// Target instance that upserts folders and dashboards by uid.
pub struct FakeTarget {
    state: Mutex<TargetState>,
    /// Fixed ids handed out per folder title.
    assigned_ids: HashMap<String, FolderId>,
    failing_folders: HashSet<String>,
    failing_imports: HashSet<String>,
    default_folder_id: FolderId,
}

impl Default for FakeTarget {
    fn default() -> Self {
        Self {
            state: Mutex::new(TargetState {
                next_id: 100,
                ..TargetState::default()
            }),
            assigned_ids: HashMap::new(),
            failing_folders: HashSet::new(),
            failing_imports: HashSet::new(),
            default_folder_id: FolderId::GENERAL,
        }
    }
}

impl FakeTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign_id(mut self, title: &str, id: i64) -> Self {
        self.assigned_ids.insert(title.to_string(), FolderId(id));
        self
    }

    pub fn failing_folder(mut self, title: &str) -> Self {
        self.failing_folders.insert(title.to_string());
        self
    }

    pub fn failing_import(mut self, uid: &str) -> Self {
        self.failing_imports.insert(uid.to_string());
        self
    }

    pub fn create_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().create_calls.clone()
    }

    pub fn import_calls(&self) -> Vec<(String, FolderId)> {
        self.state.lock().unwrap().import_calls.clone()
    }

    pub fn imports_into_unknown_folder(&self) -> Vec<String> {
        self.state.lock().unwrap().imports_into_unknown_folder.clone()
    }

    pub fn folders(&self) -> BTreeMap<String, FolderId> {
        self.state.lock().unwrap().folders_by_uid.clone()
    }

    pub fn dashboards(&self) -> BTreeMap<String, StoredDashboard> {
        self.state.lock().unwrap().dashboards.clone()
    }
}

#[async_trait]
impl TargetWriter for FakeTarget {
    async fn create_folder(&self, folder: &Folder) -> Result<FolderId> {
        let mut state = self.state.lock().unwrap();
        state.create_calls.push(folder.title.clone());

        if self.failing_folders.contains(&folder.title) {
            return Err(GraftError::folder_create_failed(
                &folder.title,
                "HTTP 500: internal error",
            ));
        }

        let key = folder.identifier();
        if let Some(existing) = state.folders_by_uid.get(&key) {
            return Ok(*existing);
        }

        let id = match self.assigned_ids.get(&folder.title) {
            Some(id) => *id,
            None => {
                state.next_id += 1;
                FolderId(state.next_id)
            }
        };
        state.folders_by_uid.insert(key, id);
        Ok(id)
    }

    async fn import_dashboard(
        &self,
        dashboard: &Dashboard,
        folder_id: FolderId,
    ) -> Result<ImportReceipt> {
        let mut state = self.state.lock().unwrap();
        state
            .import_calls
            .push((dashboard.uid.clone(), folder_id));

        let known_folder = folder_id == self.default_folder_id
            || state.folders_by_uid.values().any(|id| *id == folder_id);
        if !known_folder {
            state.imports_into_unknown_folder.push(dashboard.uid.clone());
        }

        if self.failing_imports.contains(&dashboard.uid) {
            return Err(GraftError::import_failed(
                &dashboard.uid,
                "HTTP 412: version-mismatch",
            ));
        }

        state.dashboards.insert(
            dashboard.uid.clone(),
            StoredDashboard {
                folder_id,
                payload: dashboard.payload.clone(),
            },
        );

        Ok(ImportReceipt {
            uid: dashboard.uid.clone(),
            url: Some(format!("/d/{}", dashboard.uid)),
            version: Some(1),
            status: Some("success".to_string()),
        })
    }
}

/// Artifact sink keeping exports in memory.
#[derive(Default)]
pub struct RecordingSink {
    pub stored: Mutex<Vec<Dashboard>>,
    pub fail: bool,
}

#[async_trait]
impl ArtifactSink for RecordingSink {
    async fn store(&self, dashboard: &Dashboard) -> Result<()> {
        if self.fail {
            return Err(GraftError::io("disk full"));
        }
        self.stored.lock().unwrap().push(dashboard.clone());
        Ok(())
    }
}

pub fn general() -> Folder {
    Folder::new(1, None, "General")
}

pub fn folder(id: i64, uid: &str, title: &str) -> Folder {
    Folder::new(id, Some(uid), title)
}
