//! Cached label and place resolution.
//!
//! Labels and places are resolved through one explicit, injected
//! [`ResolutionCache`] owned by the pipeline; there is no global state. The
//! cache remembers failures as well as successes: a key that is present maps
//! to its memo even when that memo is "unresolved" (`None` for labels, `""`
//! for places), so any (id, kind) pair costs at most one remote call for the
//! cache's lifetime.

use necrograph_model::EntityId;
use necrograph_wikidata::{properties, EntityStore, RawEntityRecord};
use std::collections::HashMap;

/// Hops of `P131` (located-in) to follow when a place has no direct country.
pub const DEFAULT_MAX_ADMIN_DEPTH: usize = 2;

// ============================================================================
// ResolutionCache
// ============================================================================

/// Process-lifetime memo of label and place lookups, scoped to one label
/// language.
#[derive(Debug)]
pub struct ResolutionCache {
    language: String,
    labels: HashMap<EntityId, Option<String>>,
    places: HashMap<EntityId, String>,
}

impl ResolutionCache {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            labels: HashMap::new(),
            places: HashMap::new(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Label for `id`, fetching on first sight.
    ///
    /// Failed and empty lookups are memoized as `None`; the store is asked
    /// about each id at most once.
    pub fn label<S: EntityStore + ?Sized>(&mut self, store: &S, id: &EntityId) -> Option<String> {
        if let Some(memo) = self.labels.get(id) {
            return memo.clone();
        }
        let resolved = match store.entity(id) {
            Ok(Some(record)) => record.label(&self.language).map(str::to_string),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(id = %id, error = %err, "label lookup failed");
                None
            }
        };
        self.labels.insert(id.clone(), resolved.clone());
        resolved
    }

    /// Composed `"<place>, <country>"` string for a place id, fetching and
    /// walking on first sight. The composed result (possibly empty) is
    /// memoized per place.
    pub fn place<S: EntityStore + ?Sized>(
        &mut self,
        store: &S,
        resolver: &PlaceResolver,
        id: &EntityId,
    ) -> String {
        if let Some(memo) = self.places.get(id) {
            return memo.clone();
        }
        let composed = resolver.place_with_country(store, self, id);
        self.places.insert(id.clone(), composed.clone());
        composed
    }
}

// ============================================================================
// PlaceResolver
// ============================================================================

/// Outcome of the country walk, kept distinct so callers (and tests) can
/// tell "the chain ended" from "the bound cut us off".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryLookup {
    Resolved(EntityId),
    Unresolved,
    DepthExceeded,
}

/// Resolves a place to a display string with its country.
///
/// The country comes from the place's own `P17` when present; otherwise the
/// resolver follows `P131` parents for at most `max_admin_depth` hops and
/// takes the first ancestor with a `P17`. The walk is an explicit bounded
/// loop, so self-referential or cyclic admin chains terminate at the bound.
#[derive(Debug, Clone)]
pub struct PlaceResolver {
    pub max_admin_depth: usize,
}

impl Default for PlaceResolver {
    fn default() -> Self {
        Self {
            max_admin_depth: DEFAULT_MAX_ADMIN_DEPTH,
        }
    }
}

impl PlaceResolver {
    /// `"<place label>, <country label>"`, degraded per the composition
    /// rules: no place label yields `""` (the country is not consulted), no
    /// country label yields the place label alone, and identical labels
    /// collapse to one.
    pub fn place_with_country<S: EntityStore + ?Sized>(
        &self,
        store: &S,
        cache: &mut ResolutionCache,
        place: &EntityId,
    ) -> String {
        let record = match store.entity(place) {
            Ok(Some(record)) => record,
            Ok(None) => return String::new(),
            Err(err) => {
                tracing::warn!(place = %place, error = %err, "place lookup failed");
                return String::new();
            }
        };
        let Some(place_label) = record.label(cache.language()).map(str::to_string) else {
            return String::new();
        };
        let country_label = match self.country_of(store, &record) {
            CountryLookup::Resolved(country) => cache.label(store, &country),
            CountryLookup::Unresolved | CountryLookup::DepthExceeded => None,
        };
        match country_label {
            Some(country) if !country.is_empty() && country != place_label => {
                format!("{place_label}, {country}")
            }
            _ => place_label,
        }
    }

    /// Find the country id for an already fetched place record.
    ///
    /// A direct `P17` wins without any parent traversal.
    pub fn country_of<S: EntityStore + ?Sized>(
        &self,
        store: &S,
        place: &RawEntityRecord,
    ) -> CountryLookup {
        if let Some(country) = place.entity_claim(properties::COUNTRY) {
            return CountryLookup::Resolved(country);
        }
        let mut next = place.entity_claim(properties::LOCATED_IN);
        for _ in 0..self.max_admin_depth {
            let Some(parent_id) = next else {
                return CountryLookup::Unresolved;
            };
            let parent = match store.entity(&parent_id) {
                Ok(Some(parent)) => parent,
                Ok(None) => return CountryLookup::Unresolved,
                Err(err) => {
                    tracing::warn!(parent = %parent_id, error = %err, "admin parent lookup failed");
                    return CountryLookup::Unresolved;
                }
            };
            if let Some(country) = parent.entity_claim(properties::COUNTRY) {
                return CountryLookup::Resolved(country);
            }
            next = parent.entity_claim(properties::LOCATED_IN);
        }
        if next.is_some() {
            CountryLookup::DepthExceeded
        } else {
            CountryLookup::Unresolved
        }
    }
}
