//! Write access to the instance being migrated to.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Dashboard, Folder, FolderId, ImportReceipt};

/// Creates folders and imports dashboards on a target instance.
///
/// Both operations are upserts keyed by `uid`, so repeating a run does not
/// duplicate anything.
#[async_trait]
pub trait TargetWriter: Send + Sync {
    /// Creates `folder` with its source title and uid and returns the id the
    /// target assigned. An existing folder with the same uid counts as
    /// success and its id is returned.
    async fn create_folder(&self, folder: &Folder) -> Result<FolderId>;

    /// Upserts `dashboard` into `folder_id` with overwrite enabled.
    async fn import_dashboard(
        &self,
        dashboard: &Dashboard,
        folder_id: FolderId,
    ) -> Result<ImportReceipt>;
}
