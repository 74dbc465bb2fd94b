use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use graft_core::config::GraftConfig;
use graft_core::report::{MigrationReport, ResourceKind};
use graft_execution::{MigrationOptions, MigrationOrchestrator};
use graft_infrastructure::{FileArtifactStore, HttpSourceReader, HttpTargetWriter};

use super::{ConnectionArgs, EXIT_FAILURES};

#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Maximum number of requests in flight within a phase
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Also write every exported dashboard to this directory
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Write the full JSON report to this file
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Exit with status 2 when any resource failed
    #[arg(long)]
    pub fail_on_error: bool,
}

impl MigrateArgs {
    fn resolve_config(&self) -> Result<GraftConfig> {
        let mut config = self.connection.load_config()?;
        if let Some(concurrency) = self.concurrency {
            config.migration.concurrency = concurrency;
        }
        if let Some(dir) = &self.export_dir {
            config.migration.export_dir = Some(dir.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

pub async fn run(args: MigrateArgs) -> Result<ExitCode> {
    let config = args.resolve_config()?;

    println!(
        "🚚 Migrating {} -> {}",
        config.source.url.cyan(),
        config.target.url.cyan()
    );

    let reader = Arc::new(HttpSourceReader::new(&config.source, &config.migration)?);
    let writer = Arc::new(HttpTargetWriter::new(&config.target, &config.migration)?);
    let mut orchestrator =
        MigrationOrchestrator::new(reader, writer, MigrationOptions::from_config(&config));
    if let Some(dir) = &config.migration.export_dir {
        orchestrator = orchestrator.with_artifact_sink(Arc::new(FileArtifactStore::new(dir)));
    }

    let report = orchestrator.run().await?;
    print_summary(&report);

    if let Some(path) = &args.report {
        write_report(path, &report)?;
        println!("📄 Report written to {}", path.display());
    }

    Ok(ExitCode::from(exit_status(&report, args.fail_on_error)))
}

/// Status for a completed run: per-item failures only fail the process when
/// `--fail-on-error` was given.
fn exit_status(report: &MigrationReport, fail_on_error: bool) -> u8 {
    if fail_on_error && report.has_failures() {
        EXIT_FAILURES
    } else {
        0
    }
}

fn print_summary(report: &MigrationReport) {
    println!();
    for kind in [ResourceKind::Folder, ResourceKind::Dashboard] {
        let tally = report.tally(kind);
        let failed = if tally.failed > 0 {
            tally.failed.to_string().red().bold()
        } else {
            tally.failed.to_string().normal()
        };
        println!(
            "  {:<12} {} migrated, {} failed",
            format!("{kind}s"),
            tally.success.to_string().green(),
            failed
        );
    }

    let listing_failures = report.tally(ResourceKind::DashboardListing).failed;
    if listing_failures > 0 {
        println!(
            "  {} folder(s) could not be listed",
            listing_failures.to_string().red().bold()
        );
    }

    if report.has_failures() {
        println!("\n{}", "Failed resources:".yellow().bold());
        for result in report.failures() {
            println!(
                "  ✗ [{}] {}: {}",
                result.resource_kind, result.source_identifier, result.detail
            );
        }
    } else {
        println!("\n{}", "✅ Migration completed without failures".green());
    }
    println!(
        "\nRun {} finished in {:.1}s",
        report.run_id,
        report.duration().num_milliseconds() as f64 / 1000.0
    );
}

fn write_report(path: &Path, report: &MigrationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
