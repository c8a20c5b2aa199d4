use crate::config::types::{Config, CrawlerConfig, PacingConfig};
use crate::crawler::PacingWindow;
use crate::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

static PAGE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\D*(\d+)\D+(\d+)\D*$").expect("hardcoded regex pattern is valid"));

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_pacing_config(&config.pacing)?;

    if config.site.domain.trim().is_empty() {
        return Err(ConfigError::Validation("site domain cannot be empty".to_string()));
    }

    if config.site.scheme != "http" && config.site.scheme != "https" {
        return Err(ConfigError::Validation(format!(
            "site scheme must be http or https, got '{}'",
            config.site.scheme
        )));
    }

    Ok(())
}

/// Validates retry bounds
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "page_attempts must be >= 1, got {}",
            config.page_attempts
        )));
    }

    if config.fetch_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch_retries must be >= 1, got {}",
            config.fetch_retries
        )));
    }

    if config.max_page < 1 {
        return Err(ConfigError::Validation(format!(
            "max_page must be >= 1, got {}",
            config.max_page
        )));
    }

    Ok(())
}

/// Validates every pacing window
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    validate_window("page", &config.page)?;
    validate_window("page-retry", &config.page_retry)?;
    validate_window("fetch-retry", &config.fetch_retry)?;
    validate_window("detail", &config.detail)?;
    Ok(())
}

fn validate_window(name: &str, window: &PacingWindow) -> Result<(), ConfigError> {
    if !window.min.is_finite() || !window.max.is_finite() {
        return Err(ConfigError::Validation(format!(
            "pacing window '{}' must be finite",
            name
        )));
    }

    if window.min < 0.0 || window.min > window.max {
        return Err(ConfigError::Validation(format!(
            "pacing window '{}' must satisfy 0 <= min <= max, got [{}, {}]",
            name, window.min, window.max
        )));
    }

    Ok(())
}

/// Parses a page range such as `"1-5"`, `"1 5"` or `"第1页到第5页"`
///
/// Any two digit runs separated by at least one non-digit are accepted.
/// The range must satisfy `1 <= left <= right <= max_page`.
pub fn parse_page_range(input: &str, max_page: u32) -> Result<(u32, u32), ConfigError> {
    let input = input.trim();
    let captures = PAGE_RANGE
        .captures(input)
        .ok_or_else(|| ConfigError::InvalidPageRange(format!("malformed input '{}'", input)))?;

    let parse = |idx: usize| -> Result<u32, ConfigError> {
        captures[idx]
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidPageRange(format!("page number out of range in '{}'", input)))
    };
    let left = parse(1)?;
    let right = parse(2)?;

    if left < 1 || left > right || right > max_page {
        return Err(ConfigError::InvalidPageRange(format!(
            "{}-{} (pages must satisfy 1 <= start <= end <= {})",
            left, right, max_page
        )));
    }

    Ok((left, right))
}
