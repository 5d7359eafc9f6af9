//! Relevance filtering for enriched records.

use crate::person::ResolvedPerson;
use serde::{Deserialize, Serialize};

/// Default number of optional fields a record must fill to be kept.
pub const DEFAULT_MIN_OPTIONAL_FIELDS: usize = 2;

/// Decides whether an enriched record carries enough information to keep.
///
/// A record is relevant when every required field is non-empty (label, both
/// dates, and the photo) and at least `min_optional_fields` of the optional
/// pool are filled: birth place, death place, citizenship, occupation,
/// gender, article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevancePolicy {
    pub min_optional_fields: usize,
}

impl Default for RelevancePolicy {
    fn default() -> Self {
        Self {
            min_optional_fields: DEFAULT_MIN_OPTIONAL_FIELDS,
        }
    }
}

impl RelevancePolicy {
    pub fn is_relevant(&self, person: &ResolvedPerson) -> bool {
        let required = [
            &person.person_label,
            &person.birth_date,
            &person.death_date,
            &person.photo,
        ];
        if required.iter().any(|field| field.is_empty()) {
            return false;
        }
        self.optional_filled(person) >= self.min_optional_fields
    }

    /// Count of non-empty optional fields.
    pub fn optional_filled(&self, person: &ResolvedPerson) -> usize {
        [
            &person.place_of_birth,
            &person.place_of_death,
            &person.citizenship,
            &person.occupation,
            &person.gender,
            &person.article,
        ]
        .iter()
        .filter(|field| !field.is_empty())
        .count()
    }
}
