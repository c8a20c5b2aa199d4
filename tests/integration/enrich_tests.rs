//! Detail pass end-to-end: skipped rows, login gate, failure isolation, limit

use crate::support::{html, read_gbk_csv, session, DETAIL_PAGE, LOGIN_PAGE};
use lianjia_scout::crawler::{enrich_listings, EnrichOptions, PacingWindow};
use lianjia_scout::output::{merged_header, STATUS_HEADER};
use lianjia_scout::parser::Price;
use lianjia_scout::ListingRecord;
use tempfile::TempDir;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(limit: Option<usize>) -> EnrichOptions {
    EnrichOptions {
        limit,
        fetch_retries: 1,
        fetch_retry: PacingWindow::ZERO,
        delay: PacingWindow::ZERO,
    }
}

fn record(title: &str, link: Option<String>) -> ListingRecord {
    ListingRecord {
        title: Some(title.to_string()),
        location: "天通苑, 昌平".to_string(),
        price: Price {
            total_price: Some("300 万".to_string()),
            unit_price: Some("40000 元".to_string()),
        },
        tags: vec!["近地铁".to_string()],
        link,
        ..ListingRecord::default()
    }
}

fn status_column() -> usize {
    merged_header()
        .iter()
        .position(|h| *h == STATUS_HEADER)
        .unwrap()
}

fn column(name: &str) -> usize {
    merged_header().iter().position(|h| *h == name).unwrap()
}

#[tokio::test]
async fn test_record_without_link_is_skipped_without_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("details.csv");
    let mut session = session();
    let report = enrich_listings(&mut session, &[record("无链接", None)], &options(None), &output)
        .await
        .expect("Enrichment failed");

    assert_eq!(report.skipped, 1);
    assert_eq!(session.prewarmed_count(), 0);

    let (header, rows) = read_gbk_csv(&output);
    assert_eq!(header, merged_header());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "无链接");
    assert_eq!(rows[0][1], "天通苑, 昌平");
    assert_eq!(rows[0][9], "300 万");
    assert_eq!(rows[0][status_column()], "skipped");
}

#[tokio::test]
async fn test_detail_fields_are_merged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/1.html"))
        .respond_with(html(DETAIL_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("details.csv");
    let link = format!("{}/ershoufang/1.html", server.uri());
    let report = enrich_listings(&mut session(), &[record("有详情", Some(link))], &options(None), &output)
        .await
        .expect("Enrichment failed");

    assert_eq!(report.ok, 1);
    let (_, rows) = read_gbk_csv(&output);
    assert_eq!(rows[0][column("房源标签")], "房本满五年 | 近地铁");
    assert_eq!(rows[0][column("核心卖点")], "满五唯一，税费低");
    assert_eq!(rows[0][column("挂牌时间")], "2024-05-20");
    assert_eq!(rows[0][column("交易属性")], "挂牌时间:2024-05-20 | 房屋用途:普通住宅");
    assert_eq!(rows[0][column("户型分间")], "客厅 / 30平米");
    assert_eq!(rows[0][column("小区介绍")], "");
    assert_eq!(rows[0][status_column()], "ok");
}

#[tokio::test]
async fn test_login_gate_is_a_status_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/9.html"))
        .respond_with(html(LOGIN_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("details.csv");
    let link = format!("{}/ershoufang/9.html", server.uri());
    let report = enrich_listings(&mut session(), &[record("需登录", Some(link))], &options(None), &output)
        .await
        .expect("Enrichment failed");

    assert_eq!(report.login_required, 1);
    let (_, rows) = read_gbk_csv(&output);
    assert_eq!(rows[0][status_column()], "login_required");
    assert_eq!(rows[0][column("挂牌时间")], "");
}

#[tokio::test]
async fn test_one_failure_does_not_stop_the_pass() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/1.html"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/2.html"))
        .respond_with(html(DETAIL_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let records = vec![
        record("失败", Some(format!("{}/ershoufang/1.html", server.uri()))),
        record("成功", Some(format!("{}/ershoufang/2.html", server.uri()))),
        record("跳过", None),
    ];

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("nested/details.csv");
    let report = enrich_listings(&mut session(), &records, &options(None), &output)
        .await
        .expect("Enrichment failed");

    assert_eq!((report.failed, report.ok, report.skipped), (1, 1, 1));

    let (_, rows) = read_gbk_csv(&output);
    let titles: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(titles, vec!["失败", "成功", "跳过"]);
    assert!(rows[0][status_column()].starts_with("failed: "));
    assert!(rows[0][status_column()].chars().count() <= 120);
    assert_eq!(rows[1][status_column()], "ok");
    assert_eq!(rows[2][status_column()], "skipped");
}

#[tokio::test]
async fn test_limit_caps_processed_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/1.html"))
        .respond_with(html(DETAIL_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/2.html"))
        .respond_with(html(DETAIL_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let records = vec![
        record("第一", Some(format!("{}/ershoufang/1.html", server.uri()))),
        record("第二", Some(format!("{}/ershoufang/2.html", server.uri()))),
    ];

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("details.csv");
    let report = enrich_listings(&mut session(), &records, &options(Some(1)), &output)
        .await
        .expect("Enrichment failed");

    assert_eq!(report.total(), 1);
    let (_, rows) = read_gbk_csv(&output);
    assert_eq!(rows.len(), 1);
}
