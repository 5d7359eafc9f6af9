//! Necrograph enrichment pipeline
//!
//! Turns harvested person candidates into relevance-filtered
//! [`necrograph_model::ResolvedPerson`] records:
//!
//! ```text
//! candidates.json ──► batches ──► bulk fetch (claims+labels)
//!                                     │
//!                       per person: claim extraction
//!                                     │
//!                        cached label / place resolution
//!                        (bounded admin-hierarchy walk)
//!                                     │
//!                         relevance filter ──► accepted
//!                                     │
//!                  checkpoint every N batches + final snapshot
//! ```
//!
//! Remote failures on this side degrade (log, keep going); persistence
//! failures abort, since a run that cannot checkpoint must not pretend to.
//! All remote access goes through [`necrograph_wikidata::EntityStore`], so
//! the whole pipeline runs against scripted stores in tests.

pub mod checkpoint;
pub mod fetch;
pub mod input;
pub mod pipeline;
pub mod resolve;

pub use checkpoint::{load_snapshot, CheckpointWriter};
pub use fetch::{BatchFetcher, DEFAULT_FETCH_BATCH_SIZE};
pub use input::{load_candidates, CandidateRow};
pub use pipeline::{
    EnrichmentPipeline, EnrichmentReport, PipelineConfig, PipelineError, DEFAULT_BATCH_SIZE,
    DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_MULTI_VALUE_CAP, DEFAULT_WIKI,
};
pub use resolve::{CountryLookup, PlaceResolver, ResolutionCache, DEFAULT_MAX_ADMIN_DEPTH};
