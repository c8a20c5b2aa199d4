//! Detail enrichment pass
//!
//! Walks previously crawled listings one at a time, fetches each detail page
//! and merges the known detail fields into a row. Every per-record problem
//! ends up in that row's status; the pass itself only fails if the final CSV
//! cannot be written.

use crate::crawler::fetcher::fetch_page;
use crate::crawler::pacing::PacingWindow;
use crate::crawler::session::SessionContext;
use crate::output::{write_detail_csv, EnrichReport, MergedRow};
use crate::parser::{parse_detail, ListingRecord};
use crate::state::DetailStatus;
use crate::Result;
use chrono::Utc;
use std::path::Path;
use url::Url;

/// Settings of one enrichment pass
#[derive(Debug, Clone, Copy)]
pub struct EnrichOptions {
    /// Only the first `limit` records are processed when set
    pub limit: Option<usize>,

    /// Fetcher attempts per detail page
    pub fetch_retries: u32,

    /// Sleep between attempts inside one fetch
    pub fetch_retry: PacingWindow,

    /// Sleep between records
    pub delay: PacingWindow,
}

/// Builds the merged row of one record, fetching its detail page if it has a link
pub async fn enrich_record(
    session: &mut SessionContext,
    record: &ListingRecord,
    options: &EnrichOptions,
) -> MergedRow {
    let Some(link) = record.link.as_deref().map(str::trim).filter(|l| !l.is_empty()) else {
        return MergedRow::from_listing(record, DetailStatus::Skipped);
    };
    let mut row = MergedRow::from_listing(record, DetailStatus::Ok);

    let url = match Url::parse(link) {
        Ok(url) => url,
        Err(e) => {
            row.fail(format!("invalid link: {}", e));
            return row;
        }
    };

    match fetch_page(session, &url, options.fetch_retries, options.fetch_retry).await {
        Ok(body) => row.merge_detail(&parse_detail(&body)),
        Err(e) => row.fail(e.to_string()),
    }
    row
}

/// Enriches `records` in order and writes the detail CSV to `output`
pub async fn enrich_listings(
    session: &mut SessionContext,
    records: &[ListingRecord],
    options: &EnrichOptions,
    output: &Path,
) -> Result<EnrichReport> {
    let mut report = EnrichReport {
        output_path: output.to_path_buf(),
        started_at: Some(Utc::now()),
        ..EnrichReport::default()
    };

    let selected = match options.limit {
        Some(limit) => &records[..limit.min(records.len())],
        None => records,
    };
    let total = selected.len();
    tracing::info!("Enriching {} of {} listings", total, records.len());

    let mut rows = Vec::with_capacity(total);
    for (idx, record) in selected.iter().enumerate() {
        let row = enrich_record(session, record, options).await;
        let status = row.status();
        let shown = record.link.as_deref().unwrap_or("<no link>");
        match status {
            DetailStatus::Failed(_) => {
                tracing::warn!("[{}/{}] {} -> {}", idx + 1, total, shown, status)
            }
            _ => tracing::info!("[{}/{}] {} -> {}", idx + 1, total, shown, status),
        }
        report.record(status);
        rows.push(row);

        if idx + 1 < total {
            options.delay.pause().await;
        }
    }

    write_detail_csv(&rows, output)?;
    report.finished_at = Some(Utc::now());
    tracing::info!("Wrote {} rows to {}", rows.len(), output.display());

    Ok(report)
}
