//! CLI commands.

pub mod config;
pub mod durable;
pub mod get;
pub mod resolve;
pub mod run_id;

use anyhow::{Context, Result};
use std::path::Path;
use tdm_core::{Config, DurableFile, RunId, ENV_VAR_RUN_ID};
use tracing::debug;

/// Run id from `--run`, else from `TDM_RUN_ID`. Never invents a fresh id.
pub(crate) fn run_id(arg: Option<&str>) -> Result<RunId> {
    match arg {
        Some(raw) => Ok(RunId::parse(raw)?),
        None => RunId::from_env()
            .with_context(|| format!("{} is not a valid run id", ENV_VAR_RUN_ID))?
            .with_context(|| format!("No run id given. Pass --run or set {}.", ENV_VAR_RUN_ID)),
    }
}

/// Durable file for the selected run under the configured results dir.
pub(crate) fn durable_file(root: &Path, config: &Config, run: Option<&str>) -> Result<DurableFile> {
    let run = run_id(run)?;
    Ok(DurableFile::for_run(config.results_dir(root), &run).with_mode(config.durable.write_mode))
}

/// Loads `tdm.toml`, with context on failure.
pub(crate) fn load_config(root: &Path) -> Result<Config> {
    let config = Config::load(root)
        .with_context(|| format!("Failed to load config from {}", root.display()))?;
    debug!(
        features_dir = %config.features_dir(root).display(),
        results_dir = %config.results_dir(root).display(),
        "Loaded configuration"
    );
    Ok(config)
}
