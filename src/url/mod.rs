//! URL helpers for the listing site
//!
//! Origins key the per-host warm-up, referers are derived from the origin,
//! and search-result pages live at `<listing root>pg<N>/`.

mod domain;
mod site;

// Re-export main functions
pub use domain::origin_of;
pub use site::{listing_root, page_url, referer_for, LISTING_ROOT_PATH};
