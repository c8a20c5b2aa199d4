//! Integration tests for Lianjia-Scout
//!
//! These tests use wiremock to stand in for the listing site and drive the
//! fetcher, the crawl loop and the detail pass end-to-end. All pacing
//! windows are zero so nothing sleeps.

mod crawl_tests;
mod enrich_tests;
mod fetch_tests;
mod support;
