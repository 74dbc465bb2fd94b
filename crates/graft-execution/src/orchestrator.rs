//! Two-phase folder/dashboard migration.
//!
//! Phase 1 creates every source folder on the target and records the id the
//! target assigned. Phase 2 walks the recorded folders, exports each of their
//! dashboards, sanitizes it and imports it into the mapped target folder.
//! Phase 2 starts only after phase 1 has finished, and only folders with a
//! recorded mapping take part in it.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use graft_core::artifact::ArtifactSink;
use graft_core::config::GraftConfig;
use graft_core::default_folder::DefaultFolder;
use graft_core::error::{GraftError, Result};
use graft_core::identifier_map::IdentifierMap;
use graft_core::model::{DashboardSummary, Folder, FolderId, ImportReceipt};
use graft_core::report::{MigrationReport, MigrationResult, ResourceKind};
use graft_core::source::SourceReader;
use graft_core::target::TargetWriter;
use graft_core::transform::sanitize_for_import;

use crate::aggregator::ResultAggregator;
use crate::event::RUN_SPAN_NAME;

/// Run-level settings of the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationOptions {
    /// Maximum number of resources processed at once within a phase.
    pub concurrency: usize,
    pub default_folder: DefaultFolder,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            concurrency: graft_core::config::DEFAULT_CONCURRENCY,
            default_folder: DefaultFolder::default(),
        }
    }
}

impl MigrationOptions {
    pub fn from_config(config: &GraftConfig) -> Self {
        Self {
            concurrency: config.migration.concurrency.max(1),
            default_folder: config.default_folder.clone(),
        }
    }

    /// Sequential processing, one request in flight at a time.
    pub fn sequential() -> Self {
        Self {
            concurrency: 1,
            ..Self::default()
        }
    }
}

/// Drives a migration from one source instance to one target instance.
///
/// Owns the [`IdentifierMap`] and the [`ResultAggregator`] for its runs.
/// Each call to [`run`](Self::run) starts from an empty map.
pub struct MigrationOrchestrator {
    reader: Arc<dyn SourceReader>,
    writer: Arc<dyn TargetWriter>,
    artifacts: Option<Arc<dyn ArtifactSink>>,
    options: MigrationOptions,
    identifier_map: IdentifierMap,
    aggregator: ResultAggregator,
}

impl MigrationOrchestrator {
    /// A concurrency of 0 is raised to 1 so the worker pool stays bounded.
    pub fn new(
        reader: Arc<dyn SourceReader>,
        writer: Arc<dyn TargetWriter>,
        mut options: MigrationOptions,
    ) -> Self {
        options.concurrency = options.concurrency.max(1);
        Self {
            reader,
            writer,
            artifacts: None,
            options,
            identifier_map: IdentifierMap::new(),
            aggregator: ResultAggregator::new(),
        }
    }

    /// Stores every sanitized export in `sink` before it is imported.
    pub fn with_artifact_sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.artifacts = Some(sink);
        self
    }

    /// Folder mappings of the last run.
    pub fn identifier_map(&self) -> &IdentifierMap {
        &self.identifier_map
    }

    pub fn options(&self) -> &MigrationOptions {
        &self.options
    }

    /// Runs both phases and returns the aggregate report.
    ///
    /// # Errors
    /// - `GraftError::SourceUnavailable` if source folders cannot be listed;
    ///   nothing has been written at that point.
    /// - `GraftError::UnmappedFolder` if the dashboard phase meets a folder
    ///   without a mapping, which indicates a bug in the folder phase.
    ///
    /// Every other failure is recorded in the report.
    pub async fn run(&mut self) -> Result<MigrationReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(RUN_SPAN_NAME, run_id = %run_id);
        self.run_phases(run_id).instrument(span).await
    }

    async fn run_phases(&mut self, run_id: Uuid) -> Result<MigrationReport> {
        let started_at = Utc::now();
        self.identifier_map.clear();
        self.aggregator.drain().await;

        tracing::info!(concurrency = self.options.concurrency, "Starting migration");

        let folders = self.reader.list_folders().await.map_err(|err| {
            let err = match err {
                GraftError::SourceUnavailable { .. } => err,
                other => GraftError::source_unavailable(other.to_string()),
            };
            tracing::error!("Aborting migration: {}", err);
            err
        })?;
        tracing::info!(count = folders.len(), "Listed source folders");

        self.migrate_folders(&folders).await;
        tracing::info!(mapped = self.identifier_map.len(), "Folder phase complete");

        if let Err(err) = self.migrate_dashboards().await {
            tracing::error!("Aborting migration: {}", err);
            return Err(err);
        }

        let report = MigrationReport::new(
            run_id,
            started_at,
            Utc::now(),
            self.aggregator.drain().await,
        );
        tracing::info!(
            folders_ok = report.tally(ResourceKind::Folder).success,
            folders_failed = report.tally(ResourceKind::Folder).failed,
            dashboards_ok = report.tally(ResourceKind::Dashboard).success,
            dashboards_failed = report.tally(ResourceKind::Dashboard).failed,
            "Migration finished"
        );
        Ok(report)
    }

    /// Phase 1: create folders and record their target ids.
    async fn migrate_folders(&mut self, folders: &[Folder]) {
        let default_folder = &self.options.default_folder;
        let default_source = default_folder.source_id(folders);
        self.identifier_map
            .record(default_source, default_folder.target_id);
        tracing::debug!(
            source = %default_source,
            target = %default_folder.target_id,
            "Mapped default folder by convention"
        );

        let pending: Vec<&Folder> = folders
            .iter()
            .filter(|folder| !default_folder.matches(folder))
            .collect();

        let writer = &self.writer;
        let outcomes: Vec<(&Folder, Result<FolderId>)> = stream::iter(pending)
            .map(|folder| async move { (folder, writer.create_folder(folder).await) })
            .buffer_unordered(self.options.concurrency)
            .collect()
            .await;

        for (folder, outcome) in outcomes {
            let result = match outcome {
                Ok(target_id) => {
                    self.identifier_map.record(folder.id, target_id);
                    MigrationResult::success(
                        ResourceKind::Folder,
                        folder.identifier(),
                        target_id.to_string(),
                        format!("folder '{}' mapped {} -> {}", folder.title, folder.id, target_id),
                    )
                }
                Err(err) => MigrationResult::failed(ResourceKind::Folder, folder.identifier(), &err),
            };
            self.aggregator.record(result).await;
        }
    }

    /// Phase 2: migrate the dashboards of every mapped folder.
    async fn migrate_dashboards(&self) -> Result<()> {
        let mut source_ids: Vec<FolderId> = self.identifier_map.source_ids().collect();
        source_ids.sort();

        let listings: Vec<Result<(FolderId, FolderId, Result<Vec<DashboardSummary>>)>> =
            stream::iter(source_ids)
                .map(|source_id| async move {
                    let target_id = self.identifier_map.resolve(source_id)?;
                    let listing = self.reader.list_dashboards(source_id).await;
                    Ok::<_, GraftError>((source_id, target_id, listing))
                })
                .buffer_unordered(self.options.concurrency)
                .collect()
                .await;

        let mut work: Vec<(DashboardSummary, FolderId)> = Vec::new();
        for listing in listings {
            let (source_id, target_id, summaries) = listing?;
            match summaries {
                Ok(summaries) => {
                    tracing::debug!(
                        folder = %source_id,
                        count = summaries.len(),
                        "Listed dashboards"
                    );
                    work.extend(summaries.into_iter().map(|summary| (summary, target_id)));
                }
                Err(err) => {
                    self.aggregator
                        .record(MigrationResult::failed(
                            ResourceKind::DashboardListing,
                            source_id.to_string(),
                            &err,
                        ))
                        .await;
                }
            }
        }

        stream::iter(work)
            .map(|(summary, target_id)| self.migrate_dashboard(summary, target_id))
            .buffer_unordered(self.options.concurrency)
            .collect::<Vec<()>>()
            .await;

        Ok(())
    }

    async fn migrate_dashboard(&self, summary: DashboardSummary, target_id: FolderId) {
        let result = match self.transfer_dashboard(&summary.uid, target_id).await {
            Ok(receipt) => MigrationResult::success(
                ResourceKind::Dashboard,
                &summary.uid,
                receipt.uid,
                format!("dashboard '{}' imported into folder {}", summary.title, target_id),
            ),
            Err(err) => MigrationResult::failed(ResourceKind::Dashboard, &summary.uid, &err),
        };
        self.aggregator.record(result).await;
    }

    /// Export, sanitize, optionally archive, import.
    async fn transfer_dashboard(&self, uid: &str, target_id: FolderId) -> Result<ImportReceipt> {
        let exported = self.reader.export_dashboard(uid).await?;
        let sanitized = sanitize_for_import(&exported)?;

        if let Some(sink) = &self.artifacts
            && let Err(err) = sink.store(&sanitized).await
        {
            tracing::warn!(uid, "Failed to store dashboard export: {}", err);
        }

        self.writer.import_dashboard(&sanitized, target_id).await
    }
}
