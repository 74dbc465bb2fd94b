//! Error types for the graft migration engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::FolderId;

/// A shared error type for every graft crate.
///
/// Variants are grouped by how the orchestrator treats them: fatal source
/// errors abort the run, per-item errors are captured as
/// [`MigrationResult`](crate::report::MigrationResult) data, and
/// [`GraftError::UnmappedFolder`] marks a broken orchestration invariant.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraftError {
    /// The source instance could not be reached or refused the request.
    #[error("Source unavailable: {message}")]
    SourceUnavailable { message: String },

    /// Dashboard listing for a single folder failed.
    #[error("Failed to list dashboards in folder {folder_id}: {detail}")]
    ListDashboardsFailed { folder_id: FolderId, detail: String },

    /// Exporting one dashboard from the source failed.
    #[error("Failed to export dashboard '{uid}': {detail}")]
    DashboardExportFailed { uid: String, detail: String },

    /// An exported dashboard could not be prepared for import.
    #[error("Invalid dashboard payload '{uid}': {reason}")]
    InvalidPayload { uid: String, reason: String },

    /// Folder creation on the target failed.
    #[error("Failed to create folder '{title}': {detail}")]
    FolderCreateFailed { title: String, detail: String },

    /// Dashboard import on the target failed.
    #[error("Failed to import dashboard '{uid}': {detail}")]
    DashboardImportFailed { uid: String, detail: String },

    /// A source folder reached the dashboard phase without a recorded mapping.
    #[error("Invariant violation: source folder {0} has no target mapping")]
    UnmappedFolder(FolderId),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GraftError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a SourceUnavailable error
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
        }
    }

    /// Creates a ListDashboardsFailed error
    pub fn list_dashboards_failed(folder_id: FolderId, detail: impl Into<String>) -> Self {
        Self::ListDashboardsFailed {
            folder_id,
            detail: detail.into(),
        }
    }

    /// Creates a DashboardExportFailed error
    pub fn export_failed(uid: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::DashboardExportFailed {
            uid: uid.into(),
            detail: detail.into(),
        }
    }

    /// Creates an InvalidPayload error
    pub fn invalid_payload(uid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            uid: uid.into(),
            reason: reason.into(),
        }
    }

    /// Creates a FolderCreateFailed error
    pub fn folder_create_failed(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::FolderCreateFailed {
            title: title.into(),
            detail: detail.into(),
        }
    }

    /// Creates a DashboardImportFailed error
    pub fn import_failed(uid: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::DashboardImportFailed {
            uid: uid.into(),
            detail: detail.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this error aborts the whole run.
    ///
    /// Only an unreachable source and a broken orchestration invariant are
    /// fatal; everything else is recorded per resource.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. } | Self::UnmappedFolder(_))
    }

    /// Check if this error signals an orchestration bug rather than an
    /// environmental failure.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::UnmappedFolder(_))
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns the operator-facing detail without the variant prefix.
    pub fn detail(&self) -> String {
        match self {
            Self::SourceUnavailable { message } => message.clone(),
            Self::ListDashboardsFailed { detail, .. }
            | Self::DashboardExportFailed { detail, .. }
            | Self::FolderCreateFailed { detail, .. }
            | Self::DashboardImportFailed { detail, .. } => detail.clone(),
            Self::InvalidPayload { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for GraftError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for GraftError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for GraftError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, GraftError>`.
pub type Result<T> = std::result::Result<T, GraftError>;
