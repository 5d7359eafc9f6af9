//! The entity store seam.
//!
//! The enrichment pipeline never talks to HTTP directly; it runs against
//! [`EntityStore`], which the live [`crate::client::WikidataClient`]
//! implements and tests replace with scripted in-memory stores.

use crate::record::RawEntityRecord;
use necrograph_model::EntityId;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read access to entity records.
///
/// Lookups are best-effort from the caller's point of view: an id the
/// backend does not know is simply absent from the result, and callers
/// treat absence as missing data rather than an error.
pub trait EntityStore {
    /// Fetch labels and claims for a set of ids.
    ///
    /// Ids the backend marks missing are dropped from the map. Callers are
    /// responsible for chunking; the live API caps ids per request.
    fn entities(&self, ids: &[EntityId]) -> Result<HashMap<EntityId, RawEntityRecord>, StoreError>;

    /// Fetch a single entity, `None` when the backend does not know it.
    fn entity(&self, id: &EntityId) -> Result<Option<RawEntityRecord>, StoreError> {
        Ok(self.entities(std::slice::from_ref(id))?.remove(id))
    }

    /// Title of the entity's sitelink on `site` (e.g. `enwiki`).
    fn sitelink(&self, id: &EntityId, site: &str) -> Result<Option<String>, StoreError>;
}

impl<S: EntityStore + ?Sized> EntityStore for &S {
    fn entities(&self, ids: &[EntityId]) -> Result<HashMap<EntityId, RawEntityRecord>, StoreError> {
        (**self).entities(ids)
    }

    fn entity(&self, id: &EntityId) -> Result<Option<RawEntityRecord>, StoreError> {
        (**self).entity(id)
    }

    fn sitelink(&self, id: &EntityId, site: &str) -> Result<Option<String>, StoreError> {
        (**self).sitelink(id, site)
    }
}
