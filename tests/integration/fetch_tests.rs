//! Fetcher behaviour against a mock server: attempt counts, error selection,
//! warm-up, headers and charset handling

use crate::support::{html, listing_root, session, session_with_cookies, TEST_AGENT};
use encoding_rs::GBK;
use lianjia_scout::crawler::{fetch_page, PacingWindow};
use lianjia_scout::FetchError;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_success_makes_a_single_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(html("<html><body>ok</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session();
    let url = listing_root(&server).join("pg1/").unwrap();
    let body = fetch_page(&mut session, &url, 3, PacingWindow::ZERO)
        .await
        .expect("Fetch should succeed");

    assert!(body.contains("ok"));
}

#[tokio::test]
async fn test_server_error_retries_exactly_max_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let mut session = session();
    let url = listing_root(&server).join("pg1/").unwrap();
    let err = fetch_page(&mut session, &url, 3, PacingWindow::ZERO)
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            FetchError::Exhausted {
                attempts: 3,
                last_status: Some(500),
                ..
            }
        ),
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test]
async fn test_zero_retries_still_makes_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session();
    let url = listing_root(&server).join("pg1/").unwrap();
    assert!(fetch_page(&mut session, &url, 0, PacingWindow::ZERO).await.is_err());
}

#[tokio::test]
async fn test_blocked_page_is_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(html("<html><title>访问验证-链家</title><body>请完成验证</body></html>"))
        .expect(2)
        .mount(&server)
        .await;

    let mut session = session();
    let url = listing_root(&server).join("pg1/").unwrap();
    let err = fetch_page(&mut session, &url, 2, PacingWindow::ZERO)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Blocked { .. }), "unexpected error: {:?}", err);
}

#[tokio::test]
async fn test_verification_page_with_error_status_is_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(
            ResponseTemplate::new(403).set_body_raw(
                "<html><title>人机验证</title><body>请完成验证</body></html>".as_bytes().to_vec(),
                "text/html; charset=utf-8",
            ),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut session = session();
    let url = listing_root(&server).join("pg1/").unwrap();
    let err = fetch_page(&mut session, &url, 2, PacingWindow::ZERO)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Blocked { .. }), "unexpected error: {:?}", err);
}

#[tokio::test]
async fn test_empty_body_counts_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(html("   \n"))
        .expect(2)
        .mount(&server)
        .await;

    let mut session = session();
    let url = listing_root(&server).join("pg1/").unwrap();
    let err = fetch_page(&mut session, &url, 2, PacingWindow::ZERO)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetchError::Exhausted {
            last_status: Some(200),
            ..
        }
    ));
}

#[tokio::test]
async fn test_recovers_after_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(html("<html><body>third time lucky</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session();
    let url = listing_root(&server).join("pg1/").unwrap();
    let body = fetch_page(&mut session, &url, 3, PacingWindow::ZERO)
        .await
        .expect("Third attempt should succeed");

    assert!(body.contains("third time lucky"));
}

#[tokio::test]
async fn test_connection_refused_is_a_network_error() {
    // Bind and release a port so nothing is listening on it
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = Url::parse(&format!("http://127.0.0.1:{}/ershoufang/pg1/", port)).unwrap();

    let mut session = session();
    let err = fetch_page(&mut session, &url, 2, PacingWindow::ZERO)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network { .. }), "unexpected error: {:?}", err);
    // The failed warm-up still marks the origin as warmed
    assert_eq!(session.prewarmed_count(), 1);
}

#[tokio::test]
async fn test_warm_up_once_per_origin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/"))
        .respond_with(html("<html><body>root</body></html>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(html("<html><body>one</body></html>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg2/"))
        .respond_with(html("<html><body>two</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session();
    let root = listing_root(&server);
    for page in ["pg1/", "pg2/"] {
        fetch_page(&mut session, &root.join(page).unwrap(), 1, PacingWindow::ZERO)
            .await
            .expect("Fetch should succeed");
    }

    let origin = server.uri();
    assert!(session.is_prewarmed(&origin));
    assert_eq!(session.prewarmed_count(), 1);
}

#[tokio::test]
async fn test_request_headers() {
    let server = MockServer::start().await;
    let referer = format!("{}/ershoufang/", server.uri());
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .and(header("user-agent", TEST_AGENT))
        .and(header("referer", referer.as_str()))
        .and(header("cache-control", "no-cache"))
        .respond_with(html("<html><body>headers ok</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session();
    let url = listing_root(&server).join("pg1/").unwrap();
    let body = fetch_page(&mut session, &url, 1, PacingWindow::ZERO)
        .await
        .expect("Headers should match");
    assert!(body.contains("headers ok"));
}

#[tokio::test]
async fn test_configured_cookies_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .and(header("cookie", "lianjia_token=abc123"))
        .respond_with(html("<html><body>logged in</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_with_cookies(&[("lianjia_token", "abc123")]);
    let url = listing_root(&server).join("pg1/").unwrap();
    let body = fetch_page(&mut session, &url, 1, PacingWindow::ZERO)
        .await
        .expect("Cookie header should match");
    assert!(body.contains("logged in"));
}

#[tokio::test]
async fn test_gbk_body_is_decoded() {
    let server = MockServer::start().await;
    let (bytes, _, _) = GBK.encode("<html><body>北京二手房</body></html>");
    Mock::given(method("GET"))
        .and(path("/ershoufang/pg1/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(bytes.into_owned(), "text/html; charset=gbk"))
        .mount(&server)
        .await;

    let mut session = session();
    let url = listing_root(&server).join("pg1/").unwrap();
    let body = fetch_page(&mut session, &url, 1, PacingWindow::ZERO)
        .await
        .expect("Fetch should succeed");
    assert!(body.contains("北京二手房"));
}
