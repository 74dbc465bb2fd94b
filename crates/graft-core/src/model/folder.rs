//! Folder domain model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// System-local numeric folder identifier.
///
/// The value only has meaning on the instance that issued it; the same folder
/// has different ids on the source and the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub i64);

impl FolderId {
    /// Id Grafana uses for the built-in General folder.
    pub const GENERAL: FolderId = FolderId(0);
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for FolderId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A folder as listed by a Grafana instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Source-local identifier.
    pub id: FolderId,
    /// Cross-system identifier, reused verbatim on the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Human-readable title. Not unique.
    pub title: String,
}

impl Folder {
    pub fn new(id: impl Into<FolderId>, uid: Option<&str>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uid: uid.map(str::to_string),
            title: title.into(),
        }
    }

    /// Identifier used in reports: the uid when present, otherwise the id.
    pub fn identifier(&self) -> String {
        match &self.uid {
            Some(uid) if !uid.is_empty() => uid.clone(),
            _ => self.id.to_string(),
        }
    }
}
