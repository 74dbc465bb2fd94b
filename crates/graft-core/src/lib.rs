//! Domain types and seams for migrating Grafana folders and dashboards
//! between two instances.

pub mod artifact;
pub mod config;
pub mod default_folder;
pub mod error;
pub mod identifier_map;
pub mod model;
pub mod report;
pub mod source;
pub mod target;
pub mod transform;

// Re-export common types
pub use default_folder::DefaultFolder;
pub use error::{GraftError, Result};
pub use identifier_map::IdentifierMap;
pub use model::{Dashboard, DashboardSummary, Folder, FolderId, ImportReceipt};
pub use report::{MigrationReport, MigrationResult, Outcome, ResourceKind, Tally};
pub use transform::sanitize_for_import;
