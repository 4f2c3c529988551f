//! JSON output for batch runs.
//!
//! Results are written as one pretty-printed JSON array, one element per
//! input URL in input order. Non-ASCII text is written as-is.

use crate::models::BatchEntry;
use crate::utils::ensure_parent_dir;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write `entries` to `path`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_results(entries: &[BatchEntry], path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(entries)?;
    ensure_parent_dir(path).await?;
    fs::write(path, json).await?;
    info!(count = entries.len(), "Wrote batch results");
    Ok(())
}
