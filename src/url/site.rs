use crate::url::origin_of;
use url::Url;

/// Path of the second-hand listing index on every city subdomain
pub const LISTING_ROOT_PATH: &str = "/ershoufang/";

/// Builds the listing root for a city, e.g. `https://bj.lianjia.com/ershoufang/`
pub fn listing_root(scheme: &str, city_code: &str, domain: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}://{}.{}{}",
        scheme, city_code, domain, LISTING_ROOT_PATH
    ))
}

/// Builds the URL of one search-result page below a listing root
///
/// ```
/// use url::Url;
/// use lianjia_scout::url::page_url;
///
/// let root = Url::parse("https://bj.lianjia.com/ershoufang/").unwrap();
/// assert_eq!(
///     page_url(&root, 3).unwrap().as_str(),
///     "https://bj.lianjia.com/ershoufang/pg3/"
/// );
/// ```
pub fn page_url(root: &Url, page: u32) -> Result<Url, url::ParseError> {
    root.join(&format!("pg{}/", page))
}

/// Referer and warm-up target for any URL: the listing root on the same origin
pub fn referer_for(url: &Url) -> Option<String> {
    origin_of(url).map(|origin| format!("{}{}", origin, LISTING_ROOT_PATH))
}
