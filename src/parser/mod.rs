//! HTML extraction for search-result and detail pages
//!
//! This module turns raw page bodies into records:
//! - `listing`: one record per search-result entry
//! - `detail`: a label/value map from a listing's detail page
//! - `features`: the keyword table behind the configuration attributes
//!
//! All extraction is tolerant. Missing structure empties a field, it never
//! produces an error.

mod detail;
mod features;
mod listing;

pub use detail::{parse_detail, DetailRecord, KnownDetail, LOGIN_MARKERS};
pub use features::{
    categorise, categorise_blob, matching_features, Feature, ListingFeatures, FEATURE_TABLE,
};
pub use listing::{parse_engagement, parse_listings, Engagement, ListingRecord, Price};

use scraper::{ElementRef, Selector};

/// Trimmed, non-empty text nodes that are direct children of `element`
pub(crate) fn direct_text(element: ElementRef<'_>) -> Vec<String> {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

/// All text below `element`, concatenated and trimmed
pub(crate) fn full_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// First descendant of `element` matching `selector`
pub(crate) fn select_first<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

/// Direct element children of `element` whose tag is `tag` and whose class passes `class_filter`
pub(crate) fn child_elements<'a>(
    element: ElementRef<'a>,
    tag: &'a str,
    class_filter: impl Fn(&str) -> bool + 'a,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
        .filter(move |child| class_filter(child.value().attr("class").unwrap_or("")))
}
