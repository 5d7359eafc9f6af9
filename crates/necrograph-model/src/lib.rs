//! Necrograph domain types
//!
//! This crate defines the shared vocabulary of the enrichment pipeline:
//! - [`EntityId`]: normalized Wikidata identifiers (`Q42`), parsed from bare
//!   ids or full entity URIs,
//! - [`ResolvedPerson`]: the stable output record written to snapshots,
//! - [`RelevancePolicy`]: the required/optional field predicate that decides
//!   which records are worth keeping.
//!
//! Everything here is pure data: no I/O, no network, no caching. The heavier
//! machinery lives in `necrograph-wikidata` and `necrograph-enrich`.

pub mod entity;
pub mod person;
pub mod relevance;

pub use entity::{EntityId, EntityIdError};
pub use person::{ResolvedPerson, MULTI_VALUE_SEPARATOR};
pub use relevance::{RelevancePolicy, DEFAULT_MIN_OPTIONAL_FIELDS};
