//! Batch processing over lists of URLs.
//!
//! URLs come from a newline-delimited file (blank lines and `#` comments
//! ignored) or from an RSS/Atom feed. Each URL runs through the [`Pipeline`]
//! in order, one at a time. Failed fetches are recorded as
//! `{"url": ..., "error": "fetch_failed"}` rather than aborting the run.

use crate::models::BatchEntry;
use crate::pipeline::Pipeline;
use crate::utils::parse_url_list;
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Error tag stored for URLs whose article could not be fetched.
pub const FETCH_FAILED: &str = "fetch_failed";

/// Read a URL list file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_urls_file(path: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    let contents = fs::read_to_string(path).await?;
    let urls = parse_url_list(&contents);
    info!(count = urls.len(), "Read URL list");
    Ok(urls)
}

/// Run every URL through the pipeline sequentially, preserving input order.
#[instrument(level = "info", skip_all, fields(count = urls.len()))]
pub async fn process_urls(pipeline: &Pipeline, urls: Vec<String>) -> Vec<BatchEntry> {
    let entries: Vec<BatchEntry> = stream::iter(urls)
        .then(|url: String| async move {
            info!(%url, "Processing");
            match pipeline.analyze_url(&url).await {
                Some(result) => BatchEntry::Analyzed(result),
                None => {
                    warn!(%url, "Could not fetch article");
                    BatchEntry::Failed {
                        url,
                        error: FETCH_FAILED.to_string(),
                    }
                }
            }
        })
        .collect()
        .await;

    let failed_urls: Vec<&str> = entries
        .iter()
        .filter(|e| e.is_failed())
        .map(BatchEntry::url)
        .collect();
    let failed = failed_urls.len();
    if failed > 0 {
        debug!(?failed_urls, "URLs without an article");
    }
    info!(
        total = entries.len(),
        analyzed = entries.len() - failed,
        failed,
        "Batch complete"
    );
    entries
}
