//! HTTP fetcher implementation
//!
//! This module issues every page and detail request of a run:
//! - One best-effort warm-up GET per origin before its first real request
//! - Browser-like headers with a rotated User-Agent and a same-origin Referer
//! - Charset-aware body decoding
//! - Anti-bot detection and jittered retries

use crate::crawler::charset::decode_body;
use crate::crawler::guard::block_signature;
use crate::crawler::pacing::PacingWindow;
use crate::crawler::session::SessionContext;
use crate::url::{origin_of, referer_for};
use crate::{FetchError, FetchResult};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, CONTENT_TYPE,
    PRAGMA, REFERER, USER_AGENT,
};
use reqwest::{Response, StatusCode};
use std::time::Duration;
use url::Url;

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";
const ACCEPT_LANGUAGE_ZH: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// Deadline of the warm-up request
const WARMUP_TIMEOUT: Duration = Duration::from_secs(6);

/// Deadline of each page or detail request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Outcome of a single attempt, before retry bookkeeping
enum Attempt {
    Body(String),
    Empty,
    Blocked(&'static str, StatusCode),
    Status(StatusCode),
    Network(reqwest::Error),
}

/// Fetches a page body, retrying on any unusable response
///
/// # Retry Logic
///
/// An attempt succeeds only on HTTP 200 with a non-empty body that carries no
/// anti-bot signature, whatever the status of the page carrying it. Anything else (other status, empty body, transport
/// error, verification page) is a failed attempt and is followed by a sleep
/// from `retry_window`, except after the last attempt.
///
/// Exactly `max_retries` attempts are made (at least one). Once they are
/// spent the error is:
///
/// | Condition | Error |
/// |-----------|-------|
/// | a transport error occurred in any attempt | `Network` (the most recent one) |
/// | last attempt hit a verification page | `Blocked` |
/// | otherwise (bad status, empty body) | `Exhausted` |
///
/// # Arguments
///
/// * `session` - The run's session (client, UA pool, warmed origins)
/// * `url` - The page to fetch
/// * `max_retries` - Number of attempts
/// * `retry_window` - Sleep window between attempts
pub async fn fetch_page(
    session: &mut SessionContext,
    url: &Url,
    max_retries: u32,
    retry_window: PacingWindow,
) -> FetchResult<String> {
    warm_up(session, url).await;

    let attempts = max_retries.max(1);
    let referer = referer_for(url);
    let mut last_network: Option<reqwest::Error> = None;
    let mut last_status: Option<u16> = None;
    let mut last_blocked = false;

    for attempt in 1..=attempts {
        let headers = page_headers(&session.pick_user_agent(), referer.as_deref());
        let outcome = match session
            .client()
            .get(url.clone())
            .headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => read_attempt(response).await,
            Err(e) => Attempt::Network(e),
        };

        last_blocked = false;
        match outcome {
            Attempt::Body(body) => {
                tracing::debug!("Fetched {} on attempt {}/{}", url, attempt, attempts);
                return Ok(body);
            }
            Attempt::Empty => {
                last_status = Some(StatusCode::OK.as_u16());
                tracing::debug!("Empty body from {} (attempt {}/{})", url, attempt, attempts);
            }
            Attempt::Blocked(signature, status) => {
                last_status = Some(status.as_u16());
                last_blocked = true;
                tracing::warn!(
                    "Anti-bot page '{}' at {} (HTTP {}, attempt {}/{})",
                    signature,
                    url,
                    status,
                    attempt,
                    attempts
                );
            }
            Attempt::Status(status) => {
                last_status = Some(status.as_u16());
                tracing::debug!("HTTP {} from {} (attempt {}/{})", status, url, attempt, attempts);
            }
            Attempt::Network(e) => {
                tracing::debug!("Request to {} failed (attempt {}/{}): {}", url, attempt, attempts, e);
                last_network = Some(e);
            }
        }

        if attempt < attempts {
            retry_window.pause().await;
        }
    }

    let url = url.to_string();
    Err(match last_network {
        Some(source) => FetchError::Network { url, source },
        None if last_blocked => FetchError::Blocked { url },
        None => FetchError::Exhausted {
            url,
            attempts,
            last_status,
        },
    })
}

/// Classifies one response
///
/// The body is checked for a block signature before the status, since
/// verification pages are also served with 403 or 5xx codes.
async fn read_attempt(response: Response) -> Attempt {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(_) if status != StatusCode::OK => return Attempt::Status(status),
        Err(e) => return Attempt::Network(e),
    };

    let body = decode_body(&bytes, content_type.as_deref());
    if let Some(signature) = block_signature(&body) {
        Attempt::Blocked(signature, status)
    } else if status != StatusCode::OK {
        Attempt::Status(status)
    } else if body.trim().is_empty() {
        Attempt::Empty
    } else {
        Attempt::Body(body)
    }
}

/// Issues the one-time warm-up request for the origin of `url`
///
/// The first time an origin is seen, the configured cookies are seeded for it
/// and its listing root is requested with a plain header set. Failures are
/// logged and otherwise ignored.
async fn warm_up(session: &mut SessionContext, url: &Url) {
    let Some(origin) = origin_of(url) else {
        return;
    };
    if !session.mark_prewarmed(&origin) {
        return;
    }

    let Ok(origin_url) = Url::parse(&origin) else {
        return;
    };
    session.seed_cookies(&origin_url);

    let Some(target) = referer_for(url) else {
        return;
    };
    let headers = warmup_headers(&session.pick_user_agent());
    match session
        .client()
        .get(&target)
        .headers(headers)
        .timeout(WARMUP_TIMEOUT)
        .send()
        .await
    {
        Ok(response) => tracing::debug!("Warm-up {} -> HTTP {}", target, response.status()),
        Err(e) => tracing::debug!("Warm-up {} failed (ignored): {}", target, e),
    }
}

fn base_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_ZH));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

/// Headers of the warm-up request: no Referer, no cache directives
fn warmup_headers(user_agent: &str) -> HeaderMap {
    base_headers(user_agent)
}

/// Headers of page and detail requests
fn page_headers(user_agent: &str, referer: Option<&str>) -> HeaderMap {
    let mut headers = base_headers(user_agent);
    if let Some(value) = referer.and_then(|r| HeaderValue::from_str(r).ok()) {
        headers.insert(REFERER, value);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}
