//! Wikidata entity identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// URI prefix shared by every concept entity, and the prefix under which the
/// `person` output field is emitted.
pub const ENTITY_URI_PREFIX: &str = "http://www.wikidata.org/entity/";

// ============================================================================
// EntityId
// ============================================================================

/// A normalized Wikidata identifier: one uppercase ASCII letter followed by
/// digits (`Q42`, `P17`).
///
/// Harvested data carries entities as full URIs
/// (`http://www.wikidata.org/entity/Q42`); API responses carry bare ids.
/// [`EntityId::parse`] accepts both and stores the bare form, so ids compare
/// and hash uniformly wherever they came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityIdError {
    #[error("empty entity id")]
    Empty,
    #[error("malformed entity id: {0:?}")]
    Malformed(String),
}

impl EntityId {
    /// Parse a bare id, a prefixed id (`wd:Q42`), or a full entity URI.
    ///
    /// Normalization keeps the segment after the last `/`, `#`, or `:` and
    /// requires the letter-plus-digits shape; anything else is rejected
    /// rather than passed through to the API.
    pub fn parse(raw: &str) -> Result<Self, EntityIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EntityIdError::Empty);
        }
        let tail = trimmed
            .rsplit(['/', '#', ':'])
            .next()
            .unwrap_or(trimmed)
            .trim();
        let mut chars = tail.chars();
        let shape_ok = match chars.next() {
            Some(first) if first.is_ascii_uppercase() => {
                let digits = chars.as_str();
                !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
            }
            _ => false,
        };
        if shape_ok {
            Ok(EntityId(tail.to_string()))
        } else {
            Err(EntityIdError::Malformed(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full concept URI, the form the `person` output field uses.
    pub fn entity_uri(&self) -> String {
        format!("{ENTITY_URI_PREFIX}{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityId::parse(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = EntityIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EntityId::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}
