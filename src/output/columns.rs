//! CSV column layouts
//!
//! The listing CSV has sixteen fixed columns. The detail CSV repeats them,
//! adds one column per [`KnownDetail`] and ends with a status column.

use crate::parser::{DetailRecord, KnownDetail, ListingRecord};
use crate::state::DetailStatus;

/// Header of the listing CSV, in column order
pub const LISTING_HEADER: [&str; 16] = [
    "标题",
    "地址",
    "户型",
    "面积",
    "朝向",
    "装修情况",
    "层数",
    "建造时间",
    "楼型",
    "总价",
    "每平米单价",
    "关注人数",
    "带看次数",
    "发布时间",
    "标签",
    "详情链接",
];

/// Header of the status column in the detail CSV
pub const STATUS_HEADER: &str = "解析状态";

/// Separator used when a list is flattened into one cell
pub const CELL_LIST_SEPARATOR: &str = " | ";

/// The sixteen base cells of a listing, absent values as empty strings
pub fn listing_cells(record: &ListingRecord) -> Vec<String> {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let details = &record.details;

    vec![
        text(&record.title),
        record.location.clone(),
        text(&details.configuration),
        text(&details.area),
        text(&details.towards),
        text(&details.decorate),
        text(&details.storey),
        text(&details.period),
        text(&details.categorie),
        text(&record.price.total_price),
        text(&record.price.unit_price),
        text(&record.follow_count),
        text(&record.visit_count),
        text(&record.publish_time),
        record.tags.join(CELL_LIST_SEPARATOR),
        text(&record.link),
    ]
}

/// Full header of the detail CSV
pub fn merged_header() -> Vec<&'static str> {
    LISTING_HEADER
        .iter()
        .copied()
        .chain(KnownDetail::ALL.iter().map(KnownDetail::label))
        .chain(std::iter::once(STATUS_HEADER))
        .collect()
}

/// One row of the detail CSV
///
/// Built from a listing, optionally merged with its detail record, then
/// written once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
    base: Vec<String>,
    details: Vec<String>,
    status: DetailStatus,
}

impl MergedRow {
    /// A row with the listing's base columns and empty detail columns
    pub fn from_listing(record: &ListingRecord, status: DetailStatus) -> Self {
        Self {
            base: listing_cells(record),
            details: vec![String::new(); KnownDetail::ALL.len()],
            status,
        }
    }

    /// Copies the known detail fields and the record's status into the row
    pub fn merge_detail(&mut self, detail: &DetailRecord) {
        self.details = KnownDetail::ALL
            .iter()
            .map(|known| detail.known(*known).unwrap_or_default().trim().to_string())
            .collect();
        self.status = detail.status.clone();
    }

    /// Marks the row as failed, keeping the base columns
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = DetailStatus::Failed(reason.into());
    }

    pub fn status(&self) -> &DetailStatus {
        &self.status
    }

    /// Cell value for a header name
    pub fn cell(&self, header: &str) -> Option<String> {
        merged_header()
            .iter()
            .position(|h| *h == header)
            .and_then(|idx| self.cells().into_iter().nth(idx))
    }

    /// All cells in [`merged_header`] order
    pub fn cells(&self) -> Vec<String> {
        self.base
            .iter()
            .chain(self.details.iter())
            .cloned()
            .chain(std::iter::once(self.status.to_cell()))
            .collect()
    }
}
