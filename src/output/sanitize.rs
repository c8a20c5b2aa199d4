//! GBK sanitation for CSV export
//!
//! The CSV files are consumed by spreadsheet tools expecting GBK. Characters
//! GBK cannot represent (rare ideographs, emoji, some symbols) are dropped,
//! not transliterated.

use encoding_rs::GBK;

/// Returns true if `c` has a GBK representation
pub fn is_gbk_encodable(c: char) -> bool {
    let mut buf = [0u8; 4];
    let (_, _, had_errors) = GBK.encode(c.encode_utf8(&mut buf));
    !had_errors
}

/// Drops every character GBK cannot encode
///
/// ```
/// use lianjia_scout::output::filter_gbk;
///
/// assert_eq!(filter_gbk("南北通透😀"), "南北通透");
/// ```
pub fn filter_gbk(text: &str) -> String {
    text.chars().filter(|c| is_gbk_encodable(*c)).collect()
}

/// Filters `text` and encodes what remains as GBK bytes
pub fn encode_gbk(text: &str) -> Vec<u8> {
    let filtered = filter_gbk(text);
    let (bytes, _, _) = GBK.encode(&filtered);
    bytes.into_owned()
}
