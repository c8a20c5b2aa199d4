//! UTF-8 JSON dataset files
//!
//! The listing JSON is the input of the detail pass, so this module both
//! writes it (once per run) and loads it back.

use crate::output::traits::{OutputError, OutputResult};
use crate::parser::ListingRecord;
use crate::ConfigError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::Write;
use std::path::Path;

/// Serializes `records` as a pretty JSON array with 4-space indentation
pub fn to_pretty_json(records: &[ListingRecord]) -> OutputResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Writes the whole dataset, replacing `path` atomically
///
/// The data goes to a sibling `.tmp` file first and is renamed over `path`,
/// so a crash never leaves a truncated array behind.
pub fn write_json_dataset(path: &Path, records: &[ListingRecord]) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let bytes = to_pretty_json(records)?;
    let tmp = path.with_extension("json.tmp");
    let write = |target: &Path| -> std::io::Result<()> {
        let mut file = std::fs::File::create(target)?;
        file.write_all(&bytes)?;
        file.sync_all()
    };
    write(&tmp).map_err(|source| OutputError::Write {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Loads a listing JSON file written by a crawl
///
/// Missing fields and `null`s become empty values; an array of anything
/// other than objects is a [`ConfigError::Json`].
pub fn load_listings(path: &Path) -> Result<Vec<ListingRecord>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}
