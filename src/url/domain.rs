use url::Url;

/// Returns the `scheme://host[:port]` origin of a URL
///
/// This is the key the session uses to remember which hosts were warmed up.
/// Opaque origins (e.g. `data:` URLs) yield `None`.
pub fn origin_of(url: &Url) -> Option<String> {
    let origin = url.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}
