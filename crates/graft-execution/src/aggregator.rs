//! Collection point for per-resource outcomes.

use graft_core::report::MigrationResult;
use tokio::sync::Mutex;

use crate::event;

/// Collects [`MigrationResult`]s from concurrent workers.
///
/// Recording a result also emits its outcome event, so every resource is
/// reported exactly once.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Mutex<Vec<MigrationResult>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, result: MigrationResult) {
        event::emit(&result);
        self.results.lock().await.push(result);
    }

    pub async fn len(&self) -> usize {
        self.results.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.results.lock().await.is_empty()
    }

    /// Takes every collected result, leaving the aggregator empty.
    pub async fn drain(&self) -> Vec<MigrationResult> {
        std::mem::take(&mut *self.results.lock().await)
    }
}
