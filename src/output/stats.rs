//! Run reports
//!
//! Both passes return a small report that the CLI prints when the run ends.

use crate::state::DetailStatus;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Outcome of a listing crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub city: String,
    pub start_page: u32,
    pub end_page: u32,

    /// Pages that yielded records
    pub pages_extracted: u32,

    /// Pages given up on, with the last error seen for each
    pub failed_pages: Vec<(u32, String)>,

    /// Records collected across all pages
    pub records: usize,

    /// False when no page yielded records and the dataset was not written
    pub dataset_written: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    pub fn pages_requested(&self) -> u32 {
        self.end_page.saturating_sub(self.start_page) + 1
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Outcome of a detail enrichment pass
#[derive(Debug, Clone, Default)]
pub struct EnrichReport {
    pub ok: usize,
    pub login_required: usize,
    pub skipped: usize,
    pub failed: usize,
    pub output_path: PathBuf,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl EnrichReport {
    /// Counts one row by its final status
    pub fn record(&mut self, status: &DetailStatus) {
        match status {
            DetailStatus::Ok => self.ok += 1,
            DetailStatus::LoginRequired => self.login_required += 1,
            DetailStatus::Skipped => self.skipped += 1,
            DetailStatus::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.ok + self.login_required + self.skipped + self.failed
    }
}

/// Prints a crawl report to stdout
pub fn print_crawl_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("City: {}", report.city);
    println!(
        "Pages: {}-{} ({} requested)",
        report.start_page,
        report.end_page,
        report.pages_requested()
    );
    println!("  Extracted: {}", report.pages_extracted);
    println!("  Failed: {}", report.failed_pages.len());
    println!("Records: {}", report.records);
    println!("Duration: {}s", report.duration_seconds());
    println!();

    if !report.failed_pages.is_empty() {
        println!("Failed Pages:");
        for (page, reason) in &report.failed_pages {
            println!("  - page {}: {}", page, reason);
        }
        println!();
    }

    if !report.dataset_written {
        println!("Nothing persisted: no page yielded listings");
    }
}

/// Prints an enrichment report to stdout
pub fn print_enrich_report(report: &EnrichReport) {
    println!("=== Detail Report ===\n");

    let total = report.total();
    let percent = |count: usize| {
        if total > 0 {
            (count as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    };

    println!("Rows: {}", total);
    println!("  ok: {} ({:.1}%)", report.ok, percent(report.ok));
    println!(
        "  login_required: {} ({:.1}%)",
        report.login_required,
        percent(report.login_required)
    );
    println!("  skipped: {} ({:.1}%)", report.skipped, percent(report.skipped));
    println!("  failed: {} ({:.1}%)", report.failed, percent(report.failed));
    println!();
    println!("Output: {}", report.output_path.display());
}
