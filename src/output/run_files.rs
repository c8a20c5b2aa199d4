//! File-backed sink for a listing crawl
//!
//! A run over city `C` and pages `L..=R` owns two files in the output
//! directory: `C_L-R.csv`, appended after every page, and `C_L-R.json`,
//! written once at the end.

use crate::output::csv_sink::ListingCsvWriter;
use crate::output::json_sink::write_json_dataset;
use crate::output::traits::{ListingSink, OutputResult};
use crate::parser::ListingRecord;
use std::path::{Path, PathBuf};

/// Base name shared by a run's CSV and JSON files
pub fn run_file_stem(city: &str, start_page: u32, end_page: u32) -> String {
    format!("{}_{}-{}", city.trim(), start_page, end_page)
}

/// The CSV and JSON outputs of one crawl
pub struct RunFiles {
    csv_path: PathBuf,
    json_path: PathBuf,
    csv: Option<ListingCsvWriter>,
}

impl RunFiles {
    /// Resolves the paths of a run; nothing is created until the first page
    pub fn new(directory: &Path, city: &str, start_page: u32, end_page: u32) -> Self {
        let stem = run_file_stem(city, start_page, end_page);
        Self {
            csv_path: directory.join(format!("{}.csv", stem)),
            json_path: directory.join(format!("{}.json", stem)),
            csv: None,
        }
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn json_path(&self) -> &Path {
        &self.json_path
    }
}

impl ListingSink for RunFiles {
    fn write_page(&mut self, page: u32, records: &[ListingRecord]) -> OutputResult<()> {
        let writer = match &mut self.csv {
            Some(writer) => writer,
            slot @ None => slot.insert(ListingCsvWriter::open(&self.csv_path)?),
        };
        writer.append(records)?;
        tracing::debug!(
            "Page {}: appended {} rows to {}",
            page,
            records.len(),
            writer.path().display()
        );
        Ok(())
    }

    fn write_dataset(&mut self, records: &[ListingRecord]) -> OutputResult<()> {
        write_json_dataset(&self.json_path, records)
    }
}
