//! Read-only preview of what a migration would touch.

use futures::stream::{self, StreamExt};
use serde::Serialize;

use graft_core::default_folder::DefaultFolder;
use graft_core::error::{GraftError, Result};
use graft_core::model::Folder;
use graft_core::source::SourceReader;

/// How a source folder would be handled by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderPlan {
    /// Created (or reused by uid) on the target.
    Create,
    /// Mapped to the target's built-in folder without an API call.
    MapByConvention,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderInventory {
    pub folder: Folder,
    pub plan: FolderPlan,
    /// Number of dashboards, or the listing error.
    pub dashboards: std::result::Result<usize, String>,
}

/// Folders and dashboard counts on the source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInventory {
    pub folders: Vec<FolderInventory>,
}

impl SourceInventory {
    /// Enumerates the source without writing anything.
    ///
    /// When the source does not list its built-in folder, an entry for it is
    /// added so dashboards living there are counted too.
    pub async fn collect(
        reader: &dyn SourceReader,
        default_folder: &DefaultFolder,
        concurrency: usize,
    ) -> Result<Self> {
        let mut folders = reader.list_folders().await.map_err(|err| match err {
            GraftError::SourceUnavailable { .. } => err,
            other => GraftError::source_unavailable(other.to_string()),
        })?;

        if !folders.iter().any(|folder| default_folder.matches(folder)) {
            folders.insert(
                0,
                Folder {
                    id: default_folder.source_id(&folders),
                    uid: default_folder.uid.clone(),
                    title: default_folder.title.clone(),
                },
            );
        }

        let mut entries: Vec<FolderInventory> = stream::iter(folders)
            .map(|folder| async move {
                let dashboards = reader
                    .list_dashboards(folder.id)
                    .await
                    .map(|summaries| summaries.len())
                    .map_err(|err| err.to_string());
                let plan = if default_folder.matches(&folder) {
                    FolderPlan::MapByConvention
                } else {
                    FolderPlan::Create
                };
                FolderInventory {
                    folder,
                    plan,
                    dashboards,
                }
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        entries.sort_by_key(|entry| entry.folder.id);
        Ok(Self { folders: entries })
    }

    pub fn folders_to_create(&self) -> usize {
        self.folders
            .iter()
            .filter(|entry| entry.plan == FolderPlan::Create)
            .count()
    }

    pub fn dashboard_count(&self) -> usize {
        self.folders
            .iter()
            .filter_map(|entry| entry.dashboards.as_ref().ok())
            .sum()
    }
}
