//! Anti-bot detection
//!
//! The site answers suspicious traffic with HTTP 200 and a verification page
//! instead of content, so the status code alone says nothing. A body is
//! classified as blocked when it contains any known challenge signature.

/// Substrings that only appear on verification / challenge pages
pub const BLOCK_SIGNATURES: &[&str] = &["访问验证", "请开启JavaScript", "人机验证", "captcha-verify"];

/// Returns the first signature found in `body`, if any
pub fn block_signature(body: &str) -> Option<&'static str> {
    BLOCK_SIGNATURES
        .iter()
        .copied()
        .find(|signature| body.contains(signature))
}

/// Returns true if `body` is a verification page rather than real content
pub fn is_blocked(body: &str) -> bool {
    block_signature(body).is_some()
}
