//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: state machine for one search-result page during the listing crawl
//! - `DetailStatus`: per-record outcome of detail enrichment

mod detail_status;
mod page_state;

// Re-export main types
pub use detail_status::{DetailStatus, MAX_STATUS_LEN};
pub use page_state::PageState;
