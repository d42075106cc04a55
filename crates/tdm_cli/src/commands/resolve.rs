//! Resolve command - print merged static data.

use super::load_config;
use anyhow::{Context, Result};
use std::path::Path;
use tdm_core::{DataLoader, SourceStatus, Value};

/// Resolve and print the static document for a feature/scenario.
pub fn run(
    root: &Path,
    feature: &str,
    scenario: Option<&str>,
    env: Option<&str>,
    show_sources: bool,
) -> Result<()> {
    let config = load_config(root)?;
    let environment = env
        .map(str::to_string)
        .unwrap_or_else(|| config.environment());
    let loader = DataLoader::from_config(root, &config);

    let resolution = loader.resolve_with_report(&environment, Some(feature), scenario);

    if show_sources {
        eprintln!("Environment: {}", environment);
        for source in &resolution.sources {
            let status = match &source.status {
                SourceStatus::Loaded => "loaded".to_string(),
                SourceStatus::Missing => "missing".to_string(),
                SourceStatus::Malformed { reason } => format!("malformed ({})", reason),
            };
            eprintln!("  {:?}: {} [{}]", source.layer, source.path.display(), status);
        }
    }

    let json = serde_json::to_string_pretty(&Value::Object(resolution.document))
        .context("Failed to serialize resolved data")?;
    println!("{}", json);

    Ok(())
}
