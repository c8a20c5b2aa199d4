//! Configuration module for Lianjia-Scout
//!
//! This module handles the optional TOML configuration file, the session
//! inputs (cookies, User-Agent pool, city table) and page-range validation.
//!
//! # Example
//!
//! ```no_run
//! use lianjia_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("lianjia-scout.toml")).unwrap();
//! println!("Fetch retries: {}", config.crawler.fetch_retries);
//! ```

mod parser;
mod session;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, PacingConfig, SessionConfig, SiteConfig};

// Re-export parser and session functions
pub use parser::{load_config, resolve_config, DEFAULT_CONFIG_FILE};
pub use session::{
    collect_cookies, load_city_codes, load_cookie_file, load_user_agents, parse_cookie_string,
    resolve_city, resolve_user_agents, CookieMap,
};
pub use validation::{parse_page_range, validate};
