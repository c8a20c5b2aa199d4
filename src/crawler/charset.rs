//! Response body decoding
//!
//! The declared charset wins; otherwise the `<meta>` declaration near the top
//! of the document is used; otherwise the body is taken as UTF-8 when valid
//! and as GBK when not.

use encoding_rs::{Encoding, GBK};
use regex::Regex;
use std::sync::LazyLock;

/// How many leading bytes are searched for a `<meta>` charset declaration
const META_SNIFF_LEN: usize = 2048;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([A-Za-z0-9_\-:.]+)"#)
        .expect("hardcoded regex pattern is valid")
});

/// Extracts the `charset` parameter from a `Content-Type` header value
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}

/// Finds a charset declared in a `<meta>` tag near the start of the document
pub fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LEN)];
    let head = String::from_utf8_lossy(head);
    META_CHARSET
        .captures(&head)
        .and_then(|captures| Encoding::for_label(captures[1].as_bytes()))
}

/// Decodes a response body into text
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let declared = content_type
        .and_then(charset_from_content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()));

    match declared.or_else(|| sniff_meta_charset(bytes)) {
        Some(encoding) => {
            let (text, used, had_errors) = encoding.decode(bytes);
            if had_errors {
                tracing::debug!("Body had malformed {} sequences", used.name());
            }
            text.into_owned()
        }
        None => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => GBK.decode(bytes).0.into_owned(),
        },
    }
}
