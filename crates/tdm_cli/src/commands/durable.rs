//! Durable data file commands.

use super::{durable_file, load_config};
use anyhow::{Context, Result};
use console::style;
use std::fs;
use std::path::Path;
use tdm_core::{DurableFile, Value};

/// Print the durable document of a run.
pub fn show(root: &Path, run: Option<&str>) -> Result<()> {
    let config = load_config(root)?;
    let file = durable_file(root, &config, run)?;

    if !file.exists() {
        eprintln!(
            "{} No durable data at {}",
            style("→").cyan(),
            file.path().display()
        );
        println!("{{}}");
        return Ok(());
    }

    let doc = file
        .read_document()
        .with_context(|| format!("Failed to read {}", file.path().display()))?;
    let json = serde_json::to_string_pretty(&Value::Object(doc))
        .context("Failed to serialize durable data")?;
    println!("{}", json);

    Ok(())
}

/// Print the durable file path of a run.
pub fn path(root: &Path, run: Option<&str>) -> Result<()> {
    let config = load_config(root)?;
    let file = durable_file(root, &config, run)?;
    println!("{}", file.path().display());
    Ok(())
}

/// Delete the durable file of a run.
pub fn clear(root: &Path, run: Option<&str>) -> Result<()> {
    let config = load_config(root)?;
    let file = durable_file(root, &config, run)?;

    let existed = file.exists();
    file.clear()
        .with_context(|| format!("Failed to delete {}", file.path().display()))?;

    if existed {
        println!("{} Removed {}", style("✓").green(), file.path().display());
    } else {
        println!("{} Nothing to remove", style("✓").green());
    }

    Ok(())
}

/// List durable files in the results directory, newest first.
pub fn list(root: &Path) -> Result<()> {
    let config = load_config(root)?;
    let results_dir = config.results_dir(root);

    if !results_dir.exists() {
        println!("No results directory at {}", results_dir.display());
        return Ok(());
    }

    let mut runs = Vec::new();
    for entry in fs::read_dir(&results_dir)
        .with_context(|| format!("Failed to read {}", results_dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };

        if let Some(run) = DurableFile::run_id_from_file_name(name) {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            runs.push((run, size));
        }
    }

    if runs.is_empty() {
        println!("No durable data files in {}", results_dir.display());
        return Ok(());
    }

    runs.sort_by(|a, b| b.0.cmp(&a.0));

    println!("Durable data files in {}:", results_dir.display());
    for (run, size) in runs {
        println!(
            "  {}  started {}  ({} bytes)",
            style(run.to_string()).bold(),
            run.started_at().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
            size
        );
    }

    Ok(())
}
