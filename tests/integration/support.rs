//! Fixtures shared by the integration tests

use encoding_rs::GBK;
use lianjia_scout::config::CookieMap;
use lianjia_scout::crawler::SessionContext;
use std::path::Path;
use url::Url;
use wiremock::{MockServer, ResponseTemplate};

pub const TEST_AGENT: &str = "TestAgent/1.0";

/// A session with one fixed User-Agent and the given cookies
pub fn session_with_cookies(cookies: &[(&str, &str)]) -> SessionContext {
    let cookies: CookieMap = cookies
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    SessionContext::new(cookies, vec![TEST_AGENT.to_string()], None)
        .expect("Failed to build session")
}

pub fn session() -> SessionContext {
    session_with_cookies(&[])
}

/// Listing root on the mock server, e.g. `http://127.0.0.1:1234/ershoufang/`
pub fn listing_root(server: &MockServer) -> Url {
    Url::parse(&format!("{}/ershoufang/", server.uri())).expect("Failed to parse mock root")
}

pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

/// One search-result entry; `None` leaves the region out entirely
pub fn listing_item(title: &str, link: &str, price: Option<&str>, tags: &[&str]) -> String {
    let price_block = price
        .map(|p| {
            format!(
                r#"<div class="priceInfo"><div class="totalPrice"><span>{}</span><i>万</i></div><div class="unitPrice" data-price="51234"><span>51,234元/平</span></div></div>"#,
                p
            )
        })
        .unwrap_or_default();
    let tag_block = if tags.is_empty() {
        String::new()
    } else {
        let spans: String = tags.iter().map(|t| format!("<span>{}</span>", t)).collect();
        format!(r#"<div class="tag">{}</div>"#, spans)
    };

    format!(
        r#"<li class="clear"><div class="info clear">
            <div class="title"><a href="{link}">{title}</a></div>
            <div class="flood"><div class="positionInfo"><a>回龙观</a> - <a>龙泽</a></div></div>
            <div class="address"><div class="houseInfo">3室2厅 | 120.3平米 | 南 | 简装 | 高楼层(共18层) | 2005年建 | 塔楼</div></div>
            <div class="followInfo">12人关注 / 共2次带看 / 7天以前发布</div>
            {tag_block}
            {price_block}
        </div></li>"#,
        link = link,
        title = title,
        tag_block = tag_block,
        price_block = price_block,
    )
}

pub fn results_page(items: &[String]) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>二手房</title></head><body><ul class="sellListContent">{}</ul></body></html>"#,
        items.concat()
    )
}

/// Three entries: a complete one, one without a price, one without tags
pub fn three_item_page(base: &str) -> String {
    results_page(&[
        listing_item("完整房源", &format!("{}/ershoufang/1.html", base), Some("420"), &["近地铁", "满五年"]),
        listing_item("无价格房源", &format!("{}/ershoufang/2.html", base), None, &["随时看房"]),
        listing_item("无标签房源", &format!("{}/ershoufang/3.html", base), Some("388"), &[]),
    ])
}

pub const DETAIL_PAGE: &str = r#"<html><body>
    <div class="newwrap baseinform">
      <div class="tags clear"><div class="content"><a>房本满五年</a><a>近地铁</a></div></div>
      <div class="baseattribute clear"><div class="name">核心卖点</div><div class="content">满五唯一，税费低</div></div>
    </div>
    <div class="transaction"><ul>
      <li><span class="label">挂牌时间</span><span>2024-05-20</span></li>
      <li><span class="label">房屋用途</span><span>普通住宅</span></li>
    </ul></div>
    <div class="layout-wrapper"><div class="row"><div class="col">客厅</div><div class="col">30平米</div></div></div>
</body></html>"#;

pub const LOGIN_PAGE: &str =
    "<html><body><div class=\"login-tip\">需登录后查看完整信息</div></body></html>";

/// Reads a GBK CSV back into header + rows
pub fn read_gbk_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let bytes = std::fs::read(path).expect("Failed to read CSV");
    let (text, _, had_errors) = GBK.decode(&bytes);
    assert!(!had_errors, "CSV is not valid GBK");

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let header = reader
        .headers()
        .expect("Failed to read header")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.expect("Failed to read row").iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}
