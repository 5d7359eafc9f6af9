//! Wire-format records for `wbgetentities` responses.
//!
//! The models keep only the members the pipeline reads; serde skips the
//! rest. Claim accessors follow the upstream extraction rules: only the
//! first claim of a property counts (deeper ranks are ignored), and a claim
//! that is absent, valueless (`novalue`/`somevalue`), or of an unexpected
//! datavalue kind yields nothing rather than an error.

use necrograph_model::EntityId;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Raw response shapes
// ============================================================================

/// One entity as returned by `wbgetentities`.
///
/// Every member is defaulted: sitelink-only fetches return records without
/// labels or claims, and unknown ids come back as a bare `missing` marker.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawEntityRecord {
    #[serde(default)]
    pub id: String,
    /// Present (empty-valued) when the API does not know the id.
    #[serde(default)]
    pub missing: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, LabelValue>,
    #[serde(default)]
    pub claims: BTreeMap<String, Vec<RawClaim>>,
    #[serde(default)]
    pub sitelinks: HashMap<String, Sitelink>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelValue {
    pub language: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sitelink {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawClaim {
    #[serde(rename = "mainsnak")]
    pub main_snak: RawSnak,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSnak {
    #[serde(rename = "snaktype")]
    pub snak_type: String,
    #[serde(rename = "datavalue", default)]
    pub data_value: Option<SnakValue>,
}

impl RawSnak {
    /// The datavalue, but only for an actual `value` snak.
    pub fn value(&self) -> Option<&SnakValue> {
        if self.snak_type == "value" {
            self.data_value.as_ref()
        } else {
            None
        }
    }
}

/// Datavalue kinds the pipeline reads; everything else collapses into
/// [`SnakValue::Unsupported`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum SnakValue {
    #[serde(rename = "string")]
    Str { value: String },
    #[serde(rename = "time")]
    Time { value: TimeValue },
    #[serde(rename = "wikibase-entityid")]
    Entity { value: EntityRef },
    #[serde(rename = "globecoordinate")]
    Coordinate { value: CoordinateValue },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeValue {
    /// Wikidata timestamp verbatim, e.g. `+1952-03-11T00:00:00Z`.
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoordinateValue {
    pub latitude: f64,
    pub longitude: f64,
}

// ============================================================================
// Claim accessors
// ============================================================================

impl RawEntityRecord {
    pub fn is_missing(&self) -> bool {
        self.missing.is_some()
    }

    /// Label in the given language, if the entity carries one.
    pub fn label(&self, language: &str) -> Option<&str> {
        self.labels.get(language).map(|label| label.value.as_str())
    }

    /// Title of the sitelink for `site` (e.g. `enwiki`).
    pub fn sitelink_title(&self, site: &str) -> Option<&str> {
        self.sitelinks.get(site).map(|link| link.title.as_str())
    }

    fn first_value(&self, property: &str) -> Option<&SnakValue> {
        self.claims.get(property)?.first()?.main_snak.value()
    }

    /// First string claim of `property` (used for P18 image file names).
    pub fn string_claim(&self, property: &str) -> Option<&str> {
        match self.first_value(property)? {
            SnakValue::Str { value } => Some(value),
            _ => None,
        }
    }

    /// First time claim of `property`, as the raw Wikidata timestamp.
    pub fn time_claim(&self, property: &str) -> Option<&str> {
        match self.first_value(property)? {
            SnakValue::Time { value } => Some(value.time.as_str()),
            _ => None,
        }
    }

    /// First entity-valued claim of `property`.
    pub fn entity_claim(&self, property: &str) -> Option<EntityId> {
        match self.first_value(property)? {
            SnakValue::Entity { value } => EntityId::parse(&value.id).ok(),
            _ => None,
        }
    }

    /// First coordinate claim of `property`, formatted longitude-first as
    /// `Point(-0.1 51.5)`.
    pub fn coordinate_claim(&self, property: &str) -> Option<String> {
        match self.first_value(property)? {
            SnakValue::Coordinate { value } => {
                Some(format!("Point({} {})", value.longitude, value.latitude))
            }
            _ => None,
        }
    }

    /// Entity ids from the first `cap` claims of a multi-valued property.
    ///
    /// The cap bounds the claims scanned, not the values collected, so a
    /// valueless claim inside the window is skipped without widening it.
    pub fn entity_claims(&self, property: &str, cap: usize) -> Vec<EntityId> {
        self.claims
            .get(property)
            .into_iter()
            .flatten()
            .take(cap)
            .filter_map(|claim| match claim.main_snak.value()? {
                SnakValue::Entity { value } => EntityId::parse(&value.id).ok(),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawEntityRecord {
        serde_json::from_value(value).expect("entity record json")
    }

    fn entity_snak(id: &str) -> serde_json::Value {
        json!({
            "mainsnak": {
                "snaktype": "value",
                "datavalue": { "type": "wikibase-entityid", "value": { "id": id } }
            }
        })
    }

    #[test]
    fn parses_labels_claims_and_sitelinks() {
        let rec = record(json!({
            "id": "Q42",
            "labels": { "en": { "language": "en", "value": "Douglas Adams" } },
            "claims": {
                "P569": [{
                    "mainsnak": {
                        "snaktype": "value",
                        "datavalue": {
                            "type": "time",
                            "value": { "time": "+1952-03-11T00:00:00Z", "precision": 11 }
                        }
                    },
                    "rank": "normal"
                }],
                "P18": [{
                    "mainsnak": {
                        "snaktype": "value",
                        "datavalue": { "type": "string", "value": "Douglas adams portrait.jpg" }
                    }
                }]
            },
            "sitelinks": { "enwiki": { "site": "enwiki", "title": "Douglas Adams" } }
        }));
        assert!(!rec.is_missing());
        assert_eq!(rec.label("en"), Some("Douglas Adams"));
        assert_eq!(rec.label("de"), None);
        assert_eq!(rec.time_claim("P569"), Some("+1952-03-11T00:00:00Z"));
        assert_eq!(rec.string_claim("P18"), Some("Douglas adams portrait.jpg"));
        assert_eq!(rec.sitelink_title("enwiki"), Some("Douglas Adams"));
        assert_eq!(rec.sitelink_title("dewiki"), None);
    }

    #[test]
    fn missing_marker_is_detected() {
        let rec = record(json!({ "id": "Q999999999999", "missing": "" }));
        assert!(rec.is_missing());
    }

    #[test]
    fn coordinate_claim_formats_longitude_first() {
        let rec = record(json!({
            "id": "Q84",
            "claims": {
                "P625": [{
                    "mainsnak": {
                        "snaktype": "value",
                        "datavalue": {
                            "type": "globecoordinate",
                            "value": { "latitude": 51.5, "longitude": -0.1 }
                        }
                    }
                }]
            }
        }));
        assert_eq!(rec.coordinate_claim("P625").as_deref(), Some("Point(-0.1 51.5)"));
    }

    #[test]
    fn only_the_first_claim_counts() {
        let rec = record(json!({
            "id": "Q1",
            "claims": {
                "P569": [
                    { "mainsnak": { "snaktype": "novalue" } },
                    {
                        "mainsnak": {
                            "snaktype": "value",
                            "datavalue": {
                                "type": "time",
                                "value": { "time": "+1900-01-01T00:00:00Z" }
                            }
                        }
                    }
                ]
            }
        }));
        // The first claim is a novalue snak, so the property yields nothing
        // even though a later claim carries a value.
        assert_eq!(rec.time_claim("P569"), None);
    }

    #[test]
    fn wrong_kind_and_absent_properties_yield_none() {
        let rec = record(json!({
            "id": "Q1",
            "claims": {
                "P18": [{
                    "mainsnak": {
                        "snaktype": "value",
                        "datavalue": { "type": "wikibase-entityid", "value": { "id": "Q5" } }
                    }
                }]
            }
        }));
        assert_eq!(rec.string_claim("P18"), None);
        assert_eq!(rec.string_claim("P569"), None);
        assert_eq!(rec.entity_claim("P18").unwrap().as_str(), "Q5");
    }

    #[test]
    fn unknown_datavalue_kinds_are_absorbed() {
        let rec = record(json!({
            "id": "Q1",
            "claims": {
                "P1477": [{
                    "mainsnak": {
                        "snaktype": "value",
                        "datavalue": {
                            "type": "monolingualtext",
                            "value": { "text": "some name", "language": "en" }
                        }
                    }
                }]
            }
        }));
        assert_eq!(rec.string_claim("P1477"), None);
        let claims = &rec.claims["P1477"];
        assert_eq!(claims[0].main_snak.value(), Some(&SnakValue::Unsupported));
    }

    #[test]
    fn entity_claims_cap_bounds_claims_scanned() {
        let rec = record(json!({
            "id": "Q1",
            "claims": {
                "P106": [
                    entity_snak("Q36180"),
                    { "mainsnak": { "snaktype": "somevalue" } },
                    entity_snak("Q49757"),
                    entity_snak("Q214917"),
                ]
            }
        }));
        let capped = rec.entity_claims("P106", 3);
        // Three claims scanned: two values plus one somevalue skipped.
        assert_eq!(
            capped.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
            ["Q36180", "Q49757"]
        );
        let all = rec.entity_claims("P106", 10);
        assert_eq!(all.len(), 3);
        assert_eq!(rec.entity_claims("P27", 3), Vec::new());
    }
}
