//! Search-result page extraction
//!
//! Every `li` of the result list becomes one [`ListingRecord`]. Each field is
//! looked up on its own and a missing node only empties that field; nothing
//! on a page can make extraction fail. A page without the result list yields
//! an empty vector, which the crawl treats as a failed page.

use crate::parser::features::{categorise_blob, ListingFeatures};
use crate::parser::{direct_text, select_first};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;

macro_rules! selector {
    ($css:expr) => {
        LazyLock::new(|| Selector::parse($css).expect("hardcoded selector is valid"))
    };
}

static ITEMS: LazyLock<Selector> = selector!("ul.sellListContent > li");
static TITLE_LINK: LazyLock<Selector> = selector!("div.info.clear > div.title > a");
static POSITION_LINKS: LazyLock<Selector> =
    selector!("div.info.clear > div.flood > div.positionInfo > a");
static HOUSE_INFO: LazyLock<Selector> = selector!("div.info.clear > div.address > div");
static TOTAL_PRICE: LazyLock<Selector> =
    selector!("div.info.clear > div.priceInfo > div.totalPrice > span");
static UNIT_PRICE: LazyLock<Selector> =
    selector!("div.info.clear > div.priceInfo > div.unitPrice[data-price]");
static FOLLOW_INFO: LazyLock<Selector> = selector!("div.info.clear > div.followInfo");
static TAGS: LazyLock<Selector> = selector!("div.info.clear > div.tag");

static FOLLOW_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*人关注").expect("hardcoded regex pattern is valid"));
static VISIT_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"共(\d+)\s*次带看").expect("hardcoded regex pattern is valid"));
static PUBLISH_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:\d+天(?:以前|以内)发布)|今天发布|刚刚发布)")
        .expect("hardcoded regex pattern is valid")
});

/// Price pair, each with its unit suffix (`万` for the total, `元` per square metre)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    #[serde(default)]
    pub total_price: Option<String>,
    #[serde(default)]
    pub unit_price: Option<String>,
}

/// One search-result entry
///
/// This is also the element type of the JSON dataset, so deserialization
/// accepts `null` anywhere and a plain string in place of the tag list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    #[serde(default)]
    pub title: Option<String>,

    /// Sub-areas joined with `", "`
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub details: ListingFeatures,

    #[serde(default, deserialize_with = "null_as_default")]
    pub price: Price,

    #[serde(default)]
    pub follow_count: Option<String>,

    #[serde(default)]
    pub visit_count: Option<String>,

    #[serde(default)]
    pub publish_time: Option<String>,

    #[serde(default, deserialize_with = "tags_from_list_or_string")]
    pub tags: Vec<String>,

    /// The loose follow/visit/publish text the metrics were read from
    #[serde(default, deserialize_with = "null_as_default")]
    pub follow_info: String,

    #[serde(default)]
    pub link: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsRepr {
    List(Vec<Option<String>>),
    Text(String),
}

fn tags_from_list_or_string<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TagsRepr>::deserialize(deserializer)? {
        Some(TagsRepr::List(tags)) => tags.into_iter().flatten().collect(),
        Some(TagsRepr::Text(text)) if !text.is_empty() => vec![text],
        _ => Vec::new(),
    })
}

/// Follower / viewing / recency metrics read from the follow-info text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Engagement {
    pub follow_count: Option<String>,
    pub visit_count: Option<String>,
    pub publish_time: Option<String>,
}

/// Applies the three metric patterns independently
///
/// ```
/// use lianjia_scout::parser::parse_engagement;
///
/// let metrics = parse_engagement("12人关注 / 共3次带看 / 5天以前发布");
/// assert_eq!(metrics.follow_count.as_deref(), Some("12"));
/// assert_eq!(metrics.visit_count.as_deref(), Some("3"));
/// assert_eq!(metrics.publish_time.as_deref(), Some("5天以前发布"));
/// ```
pub fn parse_engagement(text: &str) -> Engagement {
    let capture = |re: &Regex| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    };

    Engagement {
        follow_count: capture(&FOLLOW_COUNT),
        visit_count: capture(&VISIT_COUNT),
        publish_time: capture(&PUBLISH_TIME),
    }
}

/// Parses one search-result page into listing records
///
/// # Returns
///
/// The records in page order; empty when the page has no result list.
///
/// # Example
///
/// ```
/// use lianjia_scout::parse_listings;
///
/// assert!(parse_listings("<html><body>nothing here</body></html>").is_empty());
/// ```
pub fn parse_listings(html: &str) -> Vec<ListingRecord> {
    let document = Html::parse_document(html);
    document.select(&ITEMS).map(parse_item).collect()
}

/// Extracts one record; every field is independent of the others
fn parse_item(item: ElementRef<'_>) -> ListingRecord {
    let title_link = select_first(item, &TITLE_LINK);

    let title = title_link.and_then(|a| direct_text(a).into_iter().next());

    let link = title_link
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty());

    let location = item
        .select(&POSITION_LINKS)
        .flat_map(direct_text)
        .collect::<Vec<_>>()
        .join(", ");

    let details = item
        .select(&HOUSE_INFO)
        .flat_map(direct_text)
        .next()
        .map(|blob| categorise_blob(&blob))
        .unwrap_or_default();

    let total_price = select_first(item, &TOTAL_PRICE)
        .and_then(|span| direct_text(span).into_iter().next())
        .map(|value| format!("{} 万", value));

    let unit_price = select_first(item, &UNIT_PRICE)
        .and_then(|div| div.value().attr("data-price"))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| format!("{} 元", value));

    let follow_info = item
        .select(&FOLLOW_INFO)
        .flat_map(direct_text)
        .collect::<Vec<_>>()
        .join(" / ");
    let engagement = parse_engagement(&follow_info);

    let tags = item
        .select(&TAGS)
        .flat_map(|tag| tag.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect();

    ListingRecord {
        title,
        location,
        details,
        price: Price {
            total_price,
            unit_price,
        },
        follow_count: engagement.follow_count,
        visit_count: engagement.visit_count,
        publish_time: engagement.publish_time,
        tags,
        follow_info,
        link,
    }
}
