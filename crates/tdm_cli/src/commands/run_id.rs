//! Run id command.

use anyhow::Result;
use tdm_core::RunId;

/// Print a run id for a run starting now.
pub fn run() -> Result<()> {
    println!("{}", RunId::now());
    Ok(())
}
