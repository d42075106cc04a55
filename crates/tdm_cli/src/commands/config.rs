//! Config commands.

use super::load_config;
use anyhow::{Context, Result};
use std::path::Path;
use tdm_core::{Config, CONFIG_FILE};

/// Print the effective configuration as TOML.
pub fn show(root: &Path) -> Result<()> {
    let config = load_config(root)?;
    println!("# environment in effect: {}", config.environment());
    let content = config.to_toml().context("Failed to render configuration")?;
    print!("{}", content);
    Ok(())
}

/// Write a default tdm.toml.
pub fn init(root: &Path, force: bool) -> Result<()> {
    let path = root.join(CONFIG_FILE);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    Config::default()
        .save(root)
        .context("Failed to write configuration")?;
    println!("Configuration written to {}", path.display());

    Ok(())
}
