//! Crawler coordinator - the listing crawl loop
//!
//! This module drives one crawl over a page range:
//! - Each page runs a bounded number of fetch + extract cycles
//! - Extracted pages are flushed to the sink immediately
//! - Failed pages are recorded and skipped, never fatal
//! - The accumulated dataset is written once at the end

use crate::config::{CrawlerConfig, PacingConfig};
use crate::crawler::fetcher::fetch_page;
use crate::crawler::session::SessionContext;
use crate::output::{CrawlReport, ListingSink};
use crate::parser::{parse_listings, ListingRecord};
use crate::state::PageState;
use crate::url::page_url;
use crate::{Result, ScoutError};
use chrono::Utc;
use url::Url;

/// One crawl request: a city's listing root and an inclusive page range
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// City name as entered, used in file names and reports
    pub city: String,

    /// e.g. `https://bj.lianjia.com/ershoufang/`
    pub listing_root: Url,

    pub start_page: u32,
    pub end_page: u32,
}

/// Tracks one page through its state machine
struct PageTracker {
    page: u32,
    state: PageState,
}

impl PageTracker {
    fn new(page: u32) -> Self {
        Self {
            page,
            state: PageState::Pending,
        }
    }

    fn advance(&mut self, next: PageState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(ScoutError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("Page {}: {} -> {}", self.page, self.state, next);
        self.state = next;
        Ok(())
    }
}

/// Main crawl coordinator structure
pub struct Coordinator {
    session: SessionContext,
    crawler: CrawlerConfig,
    pacing: PacingConfig,
}

impl Coordinator {
    /// Creates a coordinator around an already assembled session
    pub fn new(session: SessionContext, crawler: CrawlerConfig, pacing: PacingConfig) -> Self {
        Self {
            session,
            crawler,
            pacing,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Runs the crawl loop over every page of `job`
    ///
    /// Only sink write failures and illegal state transitions abort the run;
    /// fetch and extraction failures are contained to their page.
    pub async fn run<S: ListingSink>(&mut self, job: &CrawlJob, sink: &mut S) -> Result<CrawlReport> {
        let started_at = Utc::now();
        tracing::info!(
            "Starting crawl of {} pages {}-{} from {}",
            job.city,
            job.start_page,
            job.end_page,
            job.listing_root
        );

        let mut dataset: Vec<ListingRecord> = Vec::new();
        let mut pages_extracted = 0;
        let mut failed_pages = Vec::new();

        for page in job.start_page..=job.end_page {
            let url = page_url(&job.listing_root, page)?;
            let mut tracker = PageTracker::new(page);

            match self.crawl_page(&mut tracker, &url).await? {
                Ok(records) => {
                    sink.write_page(page, &records)?;
                    dataset.extend(records.iter().cloned());
                    pages_extracted += 1;
                    tracing::info!(
                        "Page {}: {} listings, total {}",
                        page,
                        records.len(),
                        dataset.len()
                    );
                }
                Err(reason) => {
                    tracing::warn!("Page {} failed: {}", page, reason);
                    failed_pages.push((page, reason));
                }
            }

            // Paced whatever the outcome
            if page < job.end_page {
                self.pacing.page.pause().await;
            }
        }

        let dataset_written = !dataset.is_empty();
        if dataset_written {
            sink.write_dataset(&dataset)?;
        } else {
            tracing::warn!(
                "No listings collected for {} pages {}-{}; nothing persisted",
                job.city,
                job.start_page,
                job.end_page
            );
        }

        Ok(CrawlReport {
            city: job.city.clone(),
            start_page: job.start_page,
            end_page: job.end_page,
            pages_extracted,
            failed_pages,
            records: dataset.len(),
            dataset_written,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Runs the fetch + extract cycles of one page
    ///
    /// The outer `Result` carries state machine violations; the inner one is
    /// the page outcome, with the last error message on failure.
    async fn crawl_page(
        &mut self,
        tracker: &mut PageTracker,
        url: &Url,
    ) -> Result<std::result::Result<Vec<ListingRecord>, String>> {
        let cycles = self.crawler.page_attempts.max(1);
        let mut last_error = String::new();

        for cycle in 1..=cycles {
            tracker.advance(PageState::Fetching)?;

            let outcome = match fetch_page(
                &mut self.session,
                url,
                self.crawler.fetch_retries,
                self.pacing.fetch_retry,
            )
            .await
            {
                Ok(body) => {
                    let records = parse_listings(&body);
                    if records.is_empty() {
                        Err(ScoutError::EmptyPage {
                            url: url.to_string(),
                        })
                    } else {
                        Ok(records)
                    }
                }
                Err(e) => Err(ScoutError::from(e)),
            };

            match outcome {
                Ok(records) => {
                    tracker.advance(PageState::Extracted)?;
                    return Ok(Ok(records));
                }
                Err(e) => {
                    last_error = e.to_string();
                    tracing::debug!(
                        "Page {} cycle {}/{} failed: {}",
                        tracker.page,
                        cycle,
                        cycles,
                        last_error
                    );
                }
            }

            if cycle < cycles {
                tracker.advance(PageState::Retry)?;
                self.pacing.page_retry.pause().await;
            }
        }

        tracker.advance(PageState::PageFailed)?;
        Ok(Err(last_error))
    }
}
