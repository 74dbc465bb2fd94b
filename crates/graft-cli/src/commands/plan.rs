use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::process::ExitCode;

use graft_execution::{FolderPlan, SourceInventory};
use graft_infrastructure::HttpSourceReader;

use super::ConnectionArgs;

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

pub async fn run(args: PlanArgs) -> Result<ExitCode> {
    let config = args.connection.load_config()?;
    config.validate_source()?;

    println!("🔍 Inspecting {}", config.source.url.cyan());

    let reader = HttpSourceReader::new(&config.source, &config.migration)?;
    let inventory = SourceInventory::collect(
        &reader,
        &config.default_folder,
        config.migration.concurrency,
    )
    .await?;

    println!();
    for entry in &inventory.folders {
        let action = match entry.plan {
            FolderPlan::Create => "create".green(),
            FolderPlan::MapByConvention => format!("map -> {}", config.default_folder.target_id).blue(),
        };
        let dashboards = match &entry.dashboards {
            Ok(count) => format!("{count} dashboard(s)"),
            Err(e) => format!("listing failed: {e}").red().to_string(),
        };
        println!(
            "  [{:>5}] {:<32} {:<16} {}",
            entry.folder.id.0,
            entry.folder.title,
            action,
            dashboards
        );
    }

    println!(
        "\n{} folder(s) to create, {} dashboard(s) to import",
        inventory.folders_to_create(),
        inventory.dashboard_count()
    );
    Ok(ExitCode::SUCCESS)
}
