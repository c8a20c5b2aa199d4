//! Crawl loop end-to-end: per-page cycles, incremental CSV, final JSON

use crate::support::{html, listing_root, read_gbk_csv, results_page, session, three_item_page};
use lianjia_scout::config::{CrawlerConfig, PacingConfig};
use lianjia_scout::crawler::{Coordinator, CrawlJob, PacingWindow};
use lianjia_scout::output::{ListingSink, OutputResult, RunFiles, LISTING_HEADER};
use lianjia_scout::{parse_listings, ListingRecord};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn crawler_config(page_attempts: u32, fetch_retries: u32) -> CrawlerConfig {
    CrawlerConfig {
        page_attempts,
        fetch_retries,
        max_page: 100,
    }
}

fn job(server: &MockServer, start_page: u32, end_page: u32) -> CrawlJob {
    CrawlJob {
        city: "测试".to_string(),
        listing_root: listing_root(server),
        start_page,
        end_page,
    }
}

/// Sink that only remembers what it was given
#[derive(Default)]
struct RecordingSink {
    pages: Vec<(u32, usize)>,
    dataset: Option<usize>,
}

impl ListingSink for RecordingSink {
    fn write_page(&mut self, page: u32, records: &[ListingRecord]) -> OutputResult<()> {
        self.pages.push((page, records.len()));
        Ok(())
    }

    fn write_dataset(&mut self, records: &[ListingRecord]) -> OutputResult<()> {
        self.dataset = Some(records.len());
        Ok(())
    }
}

#[test]
fn test_three_item_fixture_extraction() {
    let records = parse_listings(&three_item_page("https://bj.lianjia.com"));
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].price.total_price.as_deref(), Some("420 万"));
    assert_eq!(records[0].tags, vec!["近地铁", "满五年"]);

    let no_price = &records[1];
    assert_eq!(no_price.price.total_price.as_deref().unwrap_or(""), "");
    assert_eq!(no_price.price.unit_price, None);
    assert_eq!(no_price.tags, vec!["随时看房"]);

    let no_tags = &records[2];
    assert!(no_tags.tags.is_empty());
    assert_eq!(no_tags.details.categorie.as_deref(), Some("塔楼"));
    assert_eq!(no_tags.visit_count.as_deref(), Some("2"));
}

#[tokio::test]
async fn test_crawl_writes_csv_incrementally_and_json_at_end() {
    let server = MockServer::start().await;
    let page = three_item_page(&server.uri());
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(html(&page))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg2/"))
        .respond_with(html(&page))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut files = RunFiles::new(dir.path(), "测试", 1, 2);
    let mut coordinator = Coordinator::new(session(), crawler_config(5, 3), PacingConfig::immediate());

    let report = coordinator
        .run(&job(&server, 1, 2), &mut files)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_extracted, 2);
    assert!(report.failed_pages.is_empty());
    assert_eq!(report.records, 6);
    assert!(report.dataset_written);
    assert_eq!(coordinator.session().prewarmed_count(), 1);

    let (header, rows) = read_gbk_csv(files.csv_path());
    assert_eq!(header, LISTING_HEADER);
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0][0], "完整房源");
    assert_eq!(rows[0][1], "回龙观, 龙泽");
    assert_eq!(rows[0][14], "近地铁 | 满五年");
    assert_eq!(rows[1][9], "", "missing price must be an empty cell");
    assert_eq!(rows[2][14], "", "missing tags must be an empty cell");

    let json: Vec<ListingRecord> =
        serde_json::from_str(&std::fs::read_to_string(files.json_path()).unwrap()).unwrap();
    assert_eq!(json.len(), 6);
    assert_eq!(json[1].title.as_deref(), Some("无价格房源"));
}

#[tokio::test]
async fn test_failed_page_does_not_abort_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2 * 2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg2/"))
        .respond_with(html(&three_item_page(&server.uri())))
        .expect(1)
        .mount(&server)
        .await;

    let mut sink = RecordingSink::default();
    let mut coordinator = Coordinator::new(session(), crawler_config(2, 2), PacingConfig::immediate());
    let report = coordinator
        .run(&job(&server, 1, 2), &mut sink)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_extracted, 1);
    assert_eq!(report.failed_pages.len(), 1);
    assert_eq!(report.failed_pages[0].0, 1);
    assert!(report.failed_pages[0].1.contains("500"));
    assert_eq!(sink.pages, vec![(2, 3)]);
    assert_eq!(sink.dataset, Some(3));
}

#[tokio::test]
async fn test_page_without_listings_is_retried_as_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(html("<html><body><div>暂无数据</div></body></html>"))
        .expect(3)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut files = RunFiles::new(dir.path(), "测试", 1, 1);
    let mut coordinator = Coordinator::new(session(), crawler_config(3, 1), PacingConfig::immediate());
    let report = coordinator
        .run(&job(&server, 1, 1), &mut files)
        .await
        .expect("An empty run is not an error");

    assert_eq!(report.records, 0);
    assert!(!report.dataset_written);
    assert!(report.failed_pages[0].1.contains("No listing structure"));
    assert!(!files.csv_path().exists());
    assert!(!files.json_path().exists());
}

#[tokio::test]
async fn test_page_recovers_on_a_later_cycle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(html(&results_page(&[])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(html(&three_item_page(&server.uri())))
        .expect(1)
        .mount(&server)
        .await;

    let mut sink = RecordingSink::default();
    let mut coordinator = Coordinator::new(session(), crawler_config(5, 1), PacingConfig::immediate());
    let report = coordinator
        .run(&job(&server, 1, 1), &mut sink)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_extracted, 1);
    assert_eq!(sink.pages, vec![(1, 3)]);
}

#[tokio::test]
async fn test_failed_page_is_followed_by_a_pause() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg2/"))
        .respond_with(html(&three_item_page(&server.uri())))
        .expect(1)
        .mount(&server)
        .await;

    let pacing = PacingConfig {
        page: PacingWindow::new(0.3, 0.3),
        ..PacingConfig::immediate()
    };
    let mut sink = RecordingSink::default();
    let mut coordinator = Coordinator::new(session(), crawler_config(1, 1), pacing);

    let started = Instant::now();
    let report = coordinator
        .run(&job(&server, 1, 2), &mut sink)
        .await
        .expect("Crawl failed");

    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(report.failed_pages.len(), 1);
    assert_eq!(sink.pages, vec![(2, 3)]);
}
