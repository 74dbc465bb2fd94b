//! Domain models for migrated Grafana resources.

pub mod dashboard;
pub mod folder;

pub use dashboard::{Dashboard, DashboardSummary, ImportReceipt};
pub use folder::{Folder, FolderId};
