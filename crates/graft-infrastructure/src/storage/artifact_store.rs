//! Exported dashboard files, written atomically.
//!
//! Each dashboard lands in `<dir>/<uid>.json` as the pretty-printed
//! `{dashboard, meta}` envelope. Writes go through a temporary file in the
//! same directory followed by a rename, so a crashed run never leaves a
//! truncated export behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use graft_core::artifact::ArtifactSink;
use graft_core::error::{GraftError, Result};
use graft_core::model::Dashboard;

/// Directory-backed [`ArtifactSink`].
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the export of `uid` is written to.
    pub fn path_for(&self, uid: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(uid)))
    }

    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let file_name = path
            .file_name()
            .ok_or_else(|| GraftError::io(format!("Path has no file name: {}", path.display())))?;
        let tmp_path = self
            .dir
            .join(format!(".{}.tmp", file_name.to_string_lossy()));

        let mut tmp_file = File::create(&tmp_path).await?;
        tmp_file.write_all(contents).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);

        fs::rename(&tmp_path, path).await?;
        Ok(())
    }
}

#[async_trait]
impl ArtifactSink for FileArtifactStore {
    async fn store(&self, dashboard: &Dashboard) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(&dashboard.uid);
        let contents = serde_json::to_vec_pretty(&dashboard.export_document())?;
        self.write_atomic(&path, &contents).await?;

        tracing::debug!(uid = %dashboard.uid, path = %path.display(), "Stored dashboard export");
        Ok(())
    }
}

/// Keeps uids usable as file names.
fn file_stem(uid: &str) -> String {
    let stem: String = uid
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        "_".to_string()
    } else {
        stem
    }
}
