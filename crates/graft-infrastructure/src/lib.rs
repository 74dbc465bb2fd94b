pub mod config_service;
pub mod http;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::http::{GrafanaClient, HttpSourceReader, HttpTargetWriter};
pub use crate::storage::FileArtifactStore;
