//! Randomized pacing between requests
//!
//! A pacing window is a `[min, max]` range in seconds from which each sleep
//! is drawn uniformly. Windows carry no state; the caller decides which one
//! applies (between pages, between cycles of one page, between fetch
//! attempts, between detail records).

use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

/// A `[min, max]` sleep range in seconds
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct PacingWindow {
    pub min: f64,
    pub max: f64,
}

impl From<[f64; 2]> for PacingWindow {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl PacingWindow {
    /// A window that never sleeps
    pub const ZERO: PacingWindow = PacingWindow { min: 0.0, max: 0.0 };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Between consecutive search-result pages
    pub fn page_default() -> Self {
        Self::new(2.5, 5.5)
    }

    /// Between fetch + extract cycles of one page
    pub fn page_retry_default() -> Self {
        Self::new(1.2, 2.8)
    }

    /// Between attempts inside one fetcher call
    pub fn fetch_retry_default() -> Self {
        Self::new(1.0, 2.0)
    }

    /// Between detail-page fetches
    pub fn detail_default() -> Self {
        Self::new(0.6, 1.6)
    }

    /// Clamps user-supplied bounds to `0 <= min <= max`
    pub fn clamped(min: f64, max: f64) -> Self {
        let min = min.max(0.0);
        Self::new(min, max.max(min))
    }

    /// Draws one delay uniformly from the window
    ///
    /// Degenerate or inverted windows collapse to `min` (never negative).
    pub fn sample(&self) -> Duration {
        let min = self.min.max(0.0);
        let secs = if self.max > min {
            rand::thread_rng().gen_range(min..=self.max)
        } else {
            min
        };
        Duration::from_secs_f64(secs)
    }

    /// Sleeps for one sampled delay and returns how long it slept
    pub async fn pause(&self) -> Duration {
        let delay = self.sample();
        if !delay.is_zero() {
            tracing::trace!("Sleeping {:.2}s", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
