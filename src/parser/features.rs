//! Classification of the pipe-delimited house-info blob
//!
//! A search result carries its configuration as one line such as
//! `2室1厅 | 89.5平米 | 南 北 | 精装 | 中楼层(共6层) | 2000年建 | 板楼`.
//! Each segment is matched against an ordered keyword table. A segment is
//! stored under every attribute one of whose keywords it contains, and when
//! several segments match the same attribute the last one wins.

use serde::{Deserialize, Serialize};

/// Configuration attributes recovered from the house-info blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Room layout, e.g. `2室1厅`
    Configuration,
    /// Floor area, e.g. `89.5平米`
    Area,
    /// Orientation, e.g. `南 北`
    Towards,
    /// Decoration, e.g. `精装`
    Decorate,
    /// Floor, e.g. `中楼层(共6层)`
    Storey,
    /// Built period, e.g. `2000年建`
    Period,
    /// Building category, e.g. `板楼`
    Categorie,
}

/// Ordered attribute / keyword table, evaluated top to bottom for every segment
pub const FEATURE_TABLE: &[(Feature, &[&str])] = &[
    (Feature::Configuration, &["室", "厅"]),
    (Feature::Area, &["平米"]),
    (Feature::Towards, &["东", "南", "西", "北"]),
    (Feature::Decorate, &["精装", "简装", "毛坯"]),
    (Feature::Storey, &["层"]),
    (Feature::Period, &["年"]),
    (Feature::Categorie, &["板塔结合", "板楼", "塔楼"]),
];

/// Separator between segments of the house-info blob
pub const SEGMENT_SEPARATOR: &str = " | ";

/// Raw configuration attributes of one listing
///
/// Values keep their original text and units. Serialized with only the
/// attributes that matched, under the keys the JSON dataset has always used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub towards: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categorie: Option<String>,
}

impl ListingFeatures {
    fn slot(&mut self, feature: Feature) -> &mut Option<String> {
        match feature {
            Feature::Configuration => &mut self.configuration,
            Feature::Area => &mut self.area,
            Feature::Towards => &mut self.towards,
            Feature::Decorate => &mut self.decorate,
            Feature::Storey => &mut self.storey,
            Feature::Period => &mut self.period,
            Feature::Categorie => &mut self.categorie,
        }
    }

    /// Value stored for `feature`, if any segment matched it
    pub fn get(&self, feature: Feature) -> Option<&str> {
        match feature {
            Feature::Configuration => self.configuration.as_deref(),
            Feature::Area => self.area.as_deref(),
            Feature::Towards => self.towards.as_deref(),
            Feature::Decorate => self.decorate.as_deref(),
            Feature::Storey => self.storey.as_deref(),
            Feature::Period => self.period.as_deref(),
            Feature::Categorie => self.categorie.as_deref(),
        }
    }

    /// Overwrites the value stored for `feature`
    pub fn set(&mut self, feature: Feature, value: &str) {
        *self.slot(feature) = Some(value.to_string());
    }

    /// Returns true if no attribute matched
    pub fn is_empty(&self) -> bool {
        FEATURE_TABLE.iter().all(|(feature, _)| self.get(*feature).is_none())
    }
}

/// Attributes whose keyword set matches `segment`, in table order
pub fn matching_features(segment: &str) -> Vec<Feature> {
    FEATURE_TABLE
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|keyword| segment.contains(keyword)))
        .map(|(feature, _)| *feature)
        .collect()
}

/// Assigns every segment to the attributes it matches; later segments overwrite earlier ones
pub fn categorise<'a, I>(segments: I) -> ListingFeatures
where
    I: IntoIterator<Item = &'a str>,
{
    let mut features = ListingFeatures::default();
    for segment in segments {
        for feature in matching_features(segment) {
            features.set(feature, segment);
        }
    }
    features
}

/// Splits a house-info blob and classifies its segments
pub fn categorise_blob(blob: &str) -> ListingFeatures {
    categorise(
        blob.split(SEGMENT_SEPARATOR)
            .map(str::trim)
            .filter(|segment| !segment.is_empty()),
    )
}
