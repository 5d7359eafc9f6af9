//! The enriched person record.

use serde::{Deserialize, Serialize};

/// Separator for multi-valued output fields (`citizenship`, `occupation`).
pub const MULTI_VALUE_SEPARATOR: &str = "|";

/// One fully enriched person, as written to checkpoint and output files.
///
/// The serialized (camelCase) field names are a stable contract shared with
/// the harvested upstream data; downstream consumers key on them exactly.
/// Absent values are empty strings rather than nulls so every record has the
/// same shape and truthiness checks stay uniform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPerson {
    /// Full entity URI, e.g. `http://www.wikidata.org/entity/Q42`.
    pub person: String,
    pub person_label: String,
    /// Wikidata timestamp verbatim, e.g. `+1952-03-11T00:00:00Z`.
    pub birth_date: String,
    pub death_date: String,
    /// Commons file page URL built from the P18 claim.
    pub photo: String,
    /// WKT-style point, longitude first: `Point(-0.1 51.5)`.
    pub coords: String,
    /// `"<place>, <country>"`, or the place label alone when no country
    /// resolves (or the two labels coincide).
    pub place_of_birth: String,
    pub place_of_death: String,
    /// `|`-joined labels, capped upstream.
    pub citizenship: String,
    pub occupation: String,
    pub gender: String,
    /// English Wikipedia article URL from the enwiki sitelink.
    pub article: String,
    /// Carried through from the harvested candidate row.
    pub cause_of_death: String,
    pub cause_of_death_label: String,
}
