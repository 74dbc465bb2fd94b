use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod telemetry;

use commands::{migrate::MigrateArgs, plan::PlanArgs};

#[derive(Parser)]
#[command(name = "graft")]
#[command(about = "graft - copy Grafana folders and dashboards between instances", long_about = None)]
struct Cli {
    /// Format of log lines written to stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Human)]
    log_format: LogFormat,

    /// Append one JSON line per migrated resource to this file
    #[arg(long, global = true, value_name = "PATH")]
    events: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate folders and dashboards from the source to the target
    Migrate(MigrateArgs),
    /// Show what a migration would do without writing anything
    Plan(PlanArgs),
    /// Print the version
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Human,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match telemetry::init(cli.log_format, cli.events.as_deref()).await {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(commands::EXIT_FATAL);
        }
    };

    let outcome = match cli.command {
        Commands::Migrate(args) => commands::migrate::run(args).await,
        Commands::Plan(args) => commands::plan::run(args).await,
        Commands::Version => commands::version::show(),
    };

    if let Err(e) = telemetry.finish().await {
        eprintln!("Warning: failed to write events: {:#}", e);
    }

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(commands::exit_code_for(&e))
        }
    }
}
