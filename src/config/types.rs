use crate::crawler::PacingWindow;
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Lianjia-Scout
///
/// Every table is optional; a missing file yields [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Login session inputs captured from a browser
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Raw `Cookie` header value
    #[serde(rename = "cookie-string", default)]
    pub cookie_string: Option<String>,

    /// Cookie file (JSON object, JSON pair list, or raw header)
    #[serde(rename = "cookie-file", default)]
    pub cookie_file: Option<PathBuf>,

    /// Forced User-Agent; disables pool rotation when set
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,

    /// JSON array of candidate User-Agent strings; the bundled pool when unset
    #[serde(rename = "user-agents-path", default)]
    pub user_agents_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_string: None,
            cookie_file: None,
            user_agent: None,
            user_agents_path: None,
        }
    }
}

/// Target site layout
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// JSON object mapping city names to subdomain codes; the bundled table when unset
    #[serde(rename = "city-codes-path", default)]
    pub city_codes_path: Option<PathBuf>,

    #[serde(default = "default_domain")]
    pub domain: String,

    #[serde(default = "default_scheme")]
    pub scheme: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            city_codes_path: None,
            domain: default_domain(),
            scheme: default_scheme(),
        }
    }
}

/// Retry bounds for the listing crawl
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Fetch + extract cycles allowed per search-result page
    #[serde(rename = "page-attempts", default = "default_page_attempts")]
    pub page_attempts: u32,

    /// Attempts the fetcher makes per call
    #[serde(rename = "fetch-retries", default = "default_fetch_retries")]
    pub fetch_retries: u32,

    /// Highest page index the site serves
    #[serde(rename = "max-page", default = "default_max_page")]
    pub max_page: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_attempts: default_page_attempts(),
            fetch_retries: default_fetch_retries(),
            max_page: default_max_page(),
        }
    }
}

/// Sleep windows, in seconds, for the different pauses of a run
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Between consecutive pages, whatever their outcome
    #[serde(default = "PacingWindow::page_default")]
    pub page: PacingWindow,

    /// Between fetch + extract cycles of the same page
    #[serde(rename = "page-retry", default = "PacingWindow::page_retry_default")]
    pub page_retry: PacingWindow,

    /// Between attempts inside one fetcher call
    #[serde(rename = "fetch-retry", default = "PacingWindow::fetch_retry_default")]
    pub fetch_retry: PacingWindow,

    /// Between detail-page fetches during enrichment
    #[serde(default = "PacingWindow::detail_default")]
    pub detail: PacingWindow,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page: PacingWindow::page_default(),
            page_retry: PacingWindow::page_retry_default(),
            fetch_retry: PacingWindow::fetch_retry_default(),
            detail: PacingWindow::detail_default(),
        }
    }
}

impl PacingConfig {
    /// A configuration that never sleeps
    pub fn immediate() -> Self {
        Self {
            page: PacingWindow::ZERO,
            page_retry: PacingWindow::ZERO,
            fetch_retry: PacingWindow::ZERO,
            detail: PacingWindow::ZERO,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the per-run CSV and JSON files
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

fn default_domain() -> String {
    "lianjia.com".to_string()
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_page_attempts() -> u32 {
    5
}

fn default_fetch_retries() -> u32 {
    3
}

fn default_max_page() -> u32 {
    100
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("result/information")
}
