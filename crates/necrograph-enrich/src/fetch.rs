//! Bulk entity fetching.

use necrograph_model::EntityId;
use necrograph_wikidata::{EntityStore, RawEntityRecord};
use std::collections::HashMap;

/// Ids per `wbgetentities` request; the live API caps a request at 50.
pub const DEFAULT_FETCH_BATCH_SIZE: usize = 50;

/// Splits id lists into API-sized chunks and merges the responses.
///
/// A failed chunk degrades to nothing: the error is logged and the ids stay
/// absent from the result, which downstream treats the same as entities the
/// API does not know. Enrichment is best-effort; retry belongs to the
/// harvest side.
#[derive(Debug, Clone)]
pub struct BatchFetcher {
    batch_size: usize,
}

impl Default for BatchFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_BATCH_SIZE)
    }
}

impl BatchFetcher {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn fetch<S: EntityStore + ?Sized>(
        &self,
        store: &S,
        ids: &[EntityId],
    ) -> HashMap<EntityId, RawEntityRecord> {
        let mut records = HashMap::new();
        for chunk in ids.chunks(self.batch_size) {
            match store.entities(chunk) {
                Ok(batch) => records.extend(batch),
                Err(err) => {
                    tracing::warn!(
                        first = %chunk[0],
                        count = chunk.len(),
                        error = %err,
                        "entity batch failed; continuing without it"
                    );
                }
            }
        }
        records
    }
}
