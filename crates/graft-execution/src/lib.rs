//! Execution of folder/dashboard migrations.

pub mod aggregator;
pub mod event;
pub mod inventory;
pub mod orchestrator;
pub mod tracing_layer;

pub use aggregator::ResultAggregator;
pub use inventory::{FolderPlan, SourceInventory};
pub use orchestrator::{MigrationOptions, MigrationOrchestrator};
pub use tracing_layer::{MigrationEvent, MigrationEventLayer};
