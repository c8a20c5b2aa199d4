//! GBK CSV writers
//!
//! Every cell goes through [`encode_gbk`] before it reaches the writer, so
//! the files contain GBK bytes only.

use crate::output::columns::{listing_cells, merged_header, MergedRow, LISTING_HEADER};
use crate::output::sanitize::encode_gbk;
use crate::output::traits::{OutputError, OutputResult};
use crate::parser::ListingRecord;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

fn encoded<I, S>(cells: I) -> Vec<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cells.into_iter().map(|cell| encode_gbk(cell.as_ref())).collect()
}

fn ensure_parent(path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| OutputError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Append-mode listing CSV, flushed after every page
pub struct ListingCsvWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl ListingCsvWriter {
    /// Opens `path` for appending; the header is written only if the file is new or empty
    pub fn open(path: &Path) -> OutputResult<Self> {
        ensure_parent(path)?;
        let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| OutputError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        let mut writer = csv::Writer::from_writer(file);
        if is_new {
            writer.write_record(encoded(LISTING_HEADER))?;
            writer.flush()?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row per record and flushes to disk
    pub fn append(&mut self, records: &[ListingRecord]) -> OutputResult<()> {
        for record in records {
            self.writer.write_record(encoded(listing_cells(record)))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the detail CSV in one batch, replacing any previous file
pub fn write_detail_csv(rows: &[MergedRow], path: &Path) -> OutputResult<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(encoded(merged_header()))?;
    for row in rows {
        writer.write_record(encoded(row.cells()))?;
    }
    writer.flush()?;
    Ok(())
}
