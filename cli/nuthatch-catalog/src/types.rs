//! Bird catalog types.
//!
//! These mirror the JSON documents served by the catalog, with the lenient
//! parts of the wire format (numeric ids, measurements sent as strings,
//! `null` image lists) normalized during deserialization.

use std::num::NonZeroU32;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{DefaultOnNull, DisplayFromStr, PickFirst, serde_as};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifier of a bird in the catalog.
///
/// Always trimmed and never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, derive_more::Display)]
#[serde(transparent)]
pub struct BirdId(String);

impl BirdId {
    /// Returns `None` for blank or whitespace-only input.
    pub fn parse(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for BirdId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // The catalog serves integer ids, fixtures and older responses use strings.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        let raw = match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        };
        BirdId::parse(raw).ok_or_else(|| D::Error::custom("bird id must not be blank"))
    }
}

// ---------------------------------------------------------------------------
// Birds
// ---------------------------------------------------------------------------

/// A bird as listed in a catalog page.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirdSummary {
    pub id: BirdId,
    pub name: String,
    #[serde(default, rename = "sciName")]
    pub scientific_name: Option<String>,
    #[serde(default, rename = "status")]
    pub conservation_status: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub images: Vec<String>,
}

impl BirdSummary {
    /// The image shown for this bird in listings.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Full record of a single bird.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirdDetail {
    #[serde(flatten)]
    pub summary: BirdSummary,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub wingspan_min: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub wingspan_max: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub length_min: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub length_max: Option<f64>,
}

// ---------------------------------------------------------------------------
// Page queries
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE_SIZE: NonZeroU32 = NonZeroU32::new(25).unwrap();

/// How the catalog combines the filter parameters of a page query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum Operator {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    #[display("AND")]
    And,
    #[serde(rename = "OR", alias = "or")]
    #[display("OR")]
    Or,
}

/// Parameters of a single `GET /birds` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: NonZeroU32,
    pub page_size: NonZeroU32,
    pub region: Option<String>,
    pub has_image: Option<bool>,
    pub operator: Operator,
}

impl PageQuery {
    pub fn new(page: NonZeroU32, page_size: NonZeroU32) -> Self {
        Self {
            page,
            page_size,
            region: None,
            has_image: None,
            operator: Operator::default(),
        }
    }

    /// Query parameters in the order the catalog documents them.
    pub(crate) fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(region) = &self.region {
            pairs.push(("region", region.clone()));
        }
        if let Some(has_image) = self.has_image {
            pairs.push(("hasImg", has_image.to_string()));
        }
        pairs.push(("operator", self.operator.to_string()));
        pairs
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new(NonZeroU32::MIN, DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn bird_id_rejects_blank_input() {
        assert_eq!(BirdId::parse(""), None);
        assert_eq!(BirdId::parse("   "), None);
        assert_eq!(BirdId::parse("\t\n"), None);
        assert_eq!(BirdId::parse(" 42 ").unwrap().as_str(), "42");
    }

    #[test]
    fn bird_id_accepts_numbers_and_strings() {
        let from_number: BirdId = serde_json::from_value(json!(7)).unwrap();
        let from_string: BirdId = serde_json::from_value(json!("7")).unwrap();
        assert_eq!(from_number, from_string);

        assert!(serde_json::from_value::<BirdId>(json!("  ")).is_err());
        assert!(serde_json::from_value::<BirdId>(json!(true)).is_err());
    }

    #[test]
    fn summary_tolerates_missing_optional_fields() {
        let bird: BirdSummary = serde_json::from_value(json!({
            "id": 1,
            "name": "Robin",
            "images": null,
        }))
        .unwrap();

        assert_eq!(bird, BirdSummary {
            id: BirdId::parse("1").unwrap(),
            name: "Robin".to_string(),
            scientific_name: None,
            conservation_status: None,
            images: vec![],
        });
        assert_eq!(bird.primary_image(), None);
    }

    #[test]
    fn summary_requires_name() {
        let result = serde_json::from_value::<BirdSummary>(json!({ "id": 1 }));
        assert!(result.is_err());
    }

    #[test]
    fn detail_parses_string_measurements() {
        let detail: BirdDetail = serde_json::from_value(json!({
            "id": 12,
            "name": "Black-capped Chickadee",
            "sciName": "Poecile atricapillus",
            "status": "Low Concern",
            "images": ["a.jpg", "b.jpg"],
            "order": "Passeriformes",
            "family": "Paridae",
            "wingspanMin": "16",
            "wingspanMax": 21,
            "lengthMin": "12.5",
            "lengthMax": null,
        }))
        .unwrap();

        assert_eq!(detail.summary.name, "Black-capped Chickadee");
        assert_eq!(detail.summary.primary_image(), Some("a.jpg"));
        assert_eq!(detail.order.as_deref(), Some("Passeriformes"));
        assert_eq!(detail.wingspan_min, Some(16.0));
        assert_eq!(detail.wingspan_max, Some(21.0));
        assert_eq!(detail.length_min, Some(12.5));
        assert_eq!(detail.length_max, None);
    }

    #[test]
    fn query_pairs_skip_unset_filters() {
        let query = PageQuery::new(NonZeroU32::new(3).unwrap(), NonZeroU32::new(10).unwrap());
        assert_eq!(query.to_query_pairs(), vec![
            ("page", "3".to_string()),
            ("pageSize", "10".to_string()),
            ("operator", "AND".to_string()),
        ]);
    }

    proptest! {
        #[test]
        fn parsed_ids_are_trimmed_and_non_blank(raw in "\\PC*") {
            match BirdId::parse(&raw) {
                Some(id) => {
                    prop_assert!(!id.as_str().is_empty());
                    prop_assert_eq!(id.as_str(), raw.trim());
                },
                None => prop_assert!(raw.trim().is_empty()),
            }
        }
    }
}
