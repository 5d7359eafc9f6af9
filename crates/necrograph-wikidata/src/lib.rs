//! Wikidata access for Necrograph
//!
//! Everything that touches the Wikimedia estate lives here:
//! - [`record`]: serde models for `wbgetentities` responses and typed claim
//!   accessors over them (first-claim extraction, `Point(lon lat)` coords),
//! - [`store`]: the [`EntityStore`] seam the enrichment pipeline runs
//!   against, so tests substitute scripted stores for the live API,
//! - [`client`]: the blocking HTTP client with its courtesy delay,
//! - [`harvest`]: the paginated SPARQL-to-CSV harvester with its
//!   retry-until-success policy,
//! - [`properties`] / [`urls`]: the property ids and URL shapes the
//!   pipeline depends on.
//!
//! The enrichment side of the house is deliberately best-effort (a failed
//! fetch degrades); the harvest side is deliberately stubborn (a failed page
//! retries forever). Both policies are documented where they live.

pub mod client;
pub mod harvest;
pub mod properties;
pub mod record;
pub mod store;
pub mod urls;

pub use client::{ClientConfig, WikidataClient};
pub use harvest::{HarvestError, HarvestReport, HarvesterConfig, SparqlHarvester};
pub use record::{RawClaim, RawEntityRecord, RawSnak, SnakValue};
pub use store::{EntityStore, StoreError};
