//! Get command - look a key up through the tiers.

use super::{durable_file, load_config};
use anyhow::{Context, Result};
use std::path::Path;
use tdm_core::{resolve_key, DataLoader, DurableTier, StaticTier, Tier};

/// Look `key` up through the static tier (if a feature is given) and the
/// durable tier of the selected run.
///
/// There is no Dynamic tier outside a running scenario.
pub fn run(
    root: &Path,
    key: &str,
    feature: Option<&str>,
    scenario: Option<&str>,
    run: Option<&str>,
) -> Result<()> {
    let config = load_config(root)?;
    let loader = DataLoader::from_config(root, &config);
    let statics = StaticTier::new(loader.resolve(&config.environment(), feature, scenario));

    let durable = match run {
        Some(_) => Some(durable_file(root, &config, run)?),
        None => durable_file(root, &config, None).ok(),
    };
    let durable_tier = durable.as_ref().map(DurableTier::new);

    let mut tiers: Vec<&dyn Tier> = vec![&statics];
    if let Some(tier) = &durable_tier {
        tiers.push(tier);
    }

    match resolve_key(&tiers, key) {
        Some(hit) => {
            let json = serde_json::to_string_pretty(&hit.value)
                .context("Failed to serialize value")?;
            eprintln!("Found in {} tier", hit.tier);
            println!("{}", json);
            Ok(())
        }
        None => anyhow::bail!("Key not found: {}", key),
    }
}
