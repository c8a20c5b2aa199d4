//! Output sink traits and error types
//!
//! The crawl coordinator hands every extracted page to a [`ListingSink`] as
//! soon as it is extracted, and the whole accumulated dataset once at the end.

use crate::parser::ListingRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for the records of a listing crawl
pub trait ListingSink {
    /// Persists the records of one extracted page
    ///
    /// Called in page order, once per page that yielded records. Data written
    /// here must survive a crash later in the run.
    ///
    /// # Arguments
    ///
    /// * `page` - The page index the records came from
    /// * `records` - The page's records, in page order
    fn write_page(&mut self, page: u32, records: &[ListingRecord]) -> OutputResult<()>;

    /// Persists the whole run in one write
    ///
    /// Called once at the end of a run, and only if the run collected at
    /// least one record.
    fn write_dataset(&mut self, records: &[ListingRecord]) -> OutputResult<()>;
}
