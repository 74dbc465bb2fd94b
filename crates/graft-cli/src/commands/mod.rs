pub mod migrate;
pub mod plan;
pub mod version;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use graft_core::GraftError;
use graft_core::config::GraftConfig;
use graft_infrastructure::ConfigService;

/// Per-item failures with `--fail-on-error`.
pub const EXIT_FAILURES: u8 = 2;
/// Source unavailable or another fatal error.
pub const EXIT_FATAL: u8 = 1;
/// A dashboard referenced a folder without a mapping.
pub const EXIT_INVARIANT: u8 = 70;
pub const EXIT_CONFIG: u8 = 78;

/// Maps an error to the process exit status.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<GraftError>() {
        Some(e) if e.is_config() => EXIT_CONFIG,
        Some(e) if e.is_invariant_violation() => EXIT_INVARIANT,
        _ => EXIT_FATAL,
    }
}

/// Where the configuration comes from, plus per-invocation overrides.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Config file (default: <config dir>/graft/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Source Grafana base URL
    #[arg(long)]
    pub source_url: Option<String>,

    /// Source API key or service account token
    #[arg(long)]
    pub source_api_key: Option<String>,

    /// Target Grafana base URL
    #[arg(long)]
    pub target_url: Option<String>,

    /// Target API key or service account token
    #[arg(long)]
    pub target_api_key: Option<String>,
}

impl ConnectionArgs {
    /// File, then `GRAFT_*` environment, then flags.
    pub fn load_config(&self) -> Result<GraftConfig> {
        let mut config = ConfigService::load(self.config.as_deref())
            .context("Failed to load configuration")?;
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut GraftConfig) {
        if let Some(url) = &self.source_url {
            config.source.url = url.clone();
        }
        if let Some(key) = &self.source_api_key {
            config.source.api_key = key.clone();
        }
        if let Some(url) = &self.target_url {
            config.target.url = url.clone();
        }
        if let Some(key) = &self.target_api_key {
            config.target.api_key = key.clone();
        }
    }
}
