//! Output module for persisting crawl results
//!
//! This module handles:
//! - GBK-safe CSV files (incremental for listings, batch for details)
//! - The UTF-8 JSON dataset and loading it back for the detail pass
//! - Run reports printed at the end of each command

mod columns;
mod csv_sink;
mod json_sink;
mod run_files;
mod sanitize;
pub mod stats;
mod traits;

pub use columns::{
    listing_cells, merged_header, MergedRow, CELL_LIST_SEPARATOR, LISTING_HEADER, STATUS_HEADER,
};
pub use csv_sink::{write_detail_csv, ListingCsvWriter};
pub use json_sink::{load_listings, to_pretty_json, write_json_dataset};
pub use run_files::{run_file_stem, RunFiles};
pub use sanitize::{encode_gbk, filter_gbk, is_gbk_encodable};
pub use stats::{print_crawl_report, print_enrich_report, CrawlReport, EnrichReport};
pub use traits::{ListingSink, OutputError, OutputResult};

use std::path::{Path, PathBuf};

/// Default detail CSV path: `<input stem>_details.csv` beside the input
///
/// ```
/// use lianjia_scout::output::default_detail_output;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     default_detail_output(Path::new("result/information/北京_1-2.json")),
///     PathBuf::from("result/information/北京_1-2_details.csv")
/// );
/// ```
pub fn default_detail_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "listings".to_string());
    input.with_file_name(format!("{}_details.csv", stem))
}
