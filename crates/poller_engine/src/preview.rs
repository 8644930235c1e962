use poller_core::{apply, DataRow, ScrapeConfig, SourceStatus};
use poller_logging::poller_info;

use crate::engine::fetch_all;
use crate::fetch::Fetcher;

/// Outcome of one on-demand fetch-and-transform query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewResult {
    pub raw_rows: Vec<DataRow>,
    pub processed_rows: Vec<DataRow>,
    pub statuses: Vec<SourceStatus>,
}

/// Runs fetch and transform once, outside the loop's cadence.
///
/// A read-only probe: no sink is written, and the loop's row-count memory
/// is neither consulted nor updated, so `drifted` is always false here.
pub fn preview(cfg: &ScrapeConfig, fetcher: &dyn Fetcher) -> PreviewResult {
    poller_info!("preview scrape requested");
    let (raw_rows, statuses) = fetch_all(cfg, fetcher);
    let processed_rows = apply(&raw_rows, cfg);
    poller_info!(
        "preview scrape complete: {} raw rows, {} processed rows",
        raw_rows.len(),
        processed_rows.len()
    );
    PreviewResult {
        raw_rows,
        processed_rows,
        statuses,
    }
}
