//! The built-in folder every Grafana instance ships with.

use serde::{Deserialize, Serialize};

use crate::model::{Folder, FolderId};

pub const DEFAULT_FOLDER_TITLE: &str = "General";

/// How the built-in folder is recognised on the source and addressed on the
/// target.
///
/// The folder is never created through the API. It is matched once per run
/// and pre-seeded into the [`IdentifierMap`](crate::identifier_map::IdentifierMap).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultFolder {
    /// Title the source uses for the folder. Locale dependent on some versions.
    pub title: String,
    /// Optional uid; when set it takes precedence over the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Id the target uses to address the folder.
    pub target_id: FolderId,
}

impl Default for DefaultFolder {
    fn default() -> Self {
        Self {
            title: DEFAULT_FOLDER_TITLE.to_string(),
            uid: None,
            target_id: FolderId::GENERAL,
        }
    }
}

impl DefaultFolder {
    /// Whether `folder` is the built-in folder.
    pub fn matches(&self, folder: &Folder) -> bool {
        match &self.uid {
            Some(uid) => folder.uid.as_deref() == Some(uid.as_str()),
            None => folder.title == self.title,
        }
    }

    /// Source id of the built-in folder among `folders`.
    ///
    /// Grafana usually omits the folder from listings, in which case its
    /// conventional id is returned.
    pub fn source_id(&self, folders: &[Folder]) -> FolderId {
        folders
            .iter()
            .find(|folder| self.matches(folder))
            .map(|folder| folder.id)
            .unwrap_or(FolderId::GENERAL)
    }
}
