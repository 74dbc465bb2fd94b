//! Per-resource outcomes and the aggregate run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{AsRefStr, Display};
use uuid::Uuid;

use crate::error::GraftError;

/// Kind of resource a [`MigrationResult`] describes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    Folder,
    Dashboard,
    /// Enumeration of the dashboards inside one folder.
    DashboardListing,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Folder,
        ResourceKind::Dashboard,
        ResourceKind::DashboardListing,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    Success,
    Failed,
}

/// Outcome of one attempted resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationResult {
    pub resource_kind: ResourceKind,
    /// Folder uid (or id) or dashboard uid on the source.
    pub source_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_identifier: Option<String>,
    pub outcome: Outcome,
    pub detail: String,
}

impl MigrationResult {
    pub fn success(
        resource_kind: ResourceKind,
        source_identifier: impl Into<String>,
        target_identifier: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            resource_kind,
            source_identifier: source_identifier.into(),
            target_identifier: Some(target_identifier.into()),
            outcome: Outcome::Success,
            detail: detail.into(),
        }
    }

    pub fn failed(
        resource_kind: ResourceKind,
        source_identifier: impl Into<String>,
        error: &GraftError,
    ) -> Self {
        Self {
            resource_kind,
            source_identifier: source_identifier.into(),
            target_identifier: None,
            outcome: Outcome::Failed,
            detail: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Success/failure counts for one resource kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub success: usize,
    pub failed: usize,
}

impl Tally {
    pub fn attempted(&self) -> usize {
        self.success + self.failed
    }
}

/// Aggregate report for one migration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tallies: BTreeMap<ResourceKind, Tally>,
    pub results: Vec<MigrationResult>,
}

impl MigrationReport {
    pub fn new(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        results: Vec<MigrationResult>,
    ) -> Self {
        let mut tallies: BTreeMap<ResourceKind, Tally> = BTreeMap::new();
        for result in &results {
            let tally = tallies.entry(result.resource_kind).or_default();
            match result.outcome {
                Outcome::Success => tally.success += 1,
                Outcome::Failed => tally.failed += 1,
            }
        }

        Self {
            run_id,
            started_at,
            finished_at,
            tallies,
            results,
        }
    }

    /// Counts for `kind`; zero when nothing of that kind was attempted.
    pub fn tally(&self, kind: ResourceKind) -> Tally {
        self.tallies.get(&kind).copied().unwrap_or_default()
    }

    pub fn failures(&self) -> impl Iterator<Item = &MigrationResult> {
        self.results.iter().filter(|result| !result.is_success())
    }

    pub fn total_failures(&self) -> usize {
        self.tallies.values().map(|tally| tally.failed).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.total_failures() > 0
    }

    /// Failed source identifiers of `kind`, sorted for stable output.
    pub fn failed_identifiers(&self, kind: ResourceKind) -> Vec<&str> {
        let mut identifiers: Vec<&str> = self
            .failures()
            .filter(|result| result.resource_kind == kind)
            .map(|result| result.source_identifier.as_str())
            .collect();
        identifiers.sort_unstable();
        identifiers
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
