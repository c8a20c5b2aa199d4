//! Crawler module for page fetching and the two crawl passes
//!
//! This module contains the network side of the crate, including:
//! - The per-run session (client, cookie jar, User-Agent pool, warmed origins)
//! - HTTP fetching with warm-up, anti-bot detection and retry logic
//! - Randomized pacing between requests
//! - The listing crawl loop and the detail enrichment pass

mod charset;
mod coordinator;
mod enrich;
mod fetcher;
mod guard;
mod pacing;
mod session;

pub use charset::{charset_from_content_type, decode_body, sniff_meta_charset};
pub use coordinator::{Coordinator, CrawlJob};
pub use enrich::{enrich_listings, enrich_record, EnrichOptions};
pub use fetcher::fetch_page;
pub use guard::{block_signature, is_blocked, BLOCK_SIGNATURES};
pub use pacing::PacingWindow;
pub use session::{build_http_client, SessionContext};

use crate::config::{collect_cookies, resolve_user_agents, SessionConfig};
use std::path::Path;

/// Assembles the session of a run from config plus command-line overrides
///
/// Cookie sources are merged in precedence order and a forced User-Agent
/// (command line first) replaces the pool.
///
/// # Arguments
///
/// * `config` - The `[session]` table
/// * `cookie_string` - Raw `Cookie` header given on the command line
/// * `cookie_file` - Cookie file given on the command line
/// * `user_agent` - Forced User-Agent given on the command line
pub fn build_session(
    config: &SessionConfig,
    cookie_string: Option<&str>,
    cookie_file: Option<&Path>,
    user_agent: Option<&str>,
) -> crate::Result<SessionContext> {
    let cookies = collect_cookies(config, cookie_string, cookie_file)?;
    let (user_agents, forced) = resolve_user_agents(config, user_agent)?;

    tracing::debug!(
        "Session: {} cookies, {} user agents{}",
        cookies.len(),
        user_agents.len(),
        if forced.is_some() { " (forced)" } else { "" }
    );

    Ok(SessionContext::new(cookies, user_agents, forced)?)
}
