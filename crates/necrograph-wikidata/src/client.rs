//! Blocking Wikidata API client.
//!
//! Respectful defaults throughout: a descriptive User-Agent, a request
//! timeout, and a courtesy pause after **every** remote call, batch or
//! single. Single-entity lookups hit the same endpoint as batches, so they
//! get the same pause; skipping it for small calls is how polite clients
//! turn into impolite ones.

use crate::record::RawEntityRecord;
use crate::store::{EntityStore, StoreError};
use necrograph_model::EntityId;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;

/// Wikidata API endpoint.
pub const DEFAULT_API_URL: &str = "https://www.wikidata.org/w/api.php";

/// Identifying User-Agent, per Wikimedia's bot policy.
pub const DEFAULT_USER_AGENT: &str = "necrograph/0.1 (+https://github.com/necrograph/necrograph)";

/// Pause after every remote call, in milliseconds.
pub const DEFAULT_COURTESY_DELAY_MS: u64 = 500;

/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Language requested for labels.
pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub courtesy_delay: Duration,
    pub language: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            courtesy_delay: Duration::from_millis(DEFAULT_COURTESY_DELAY_MS),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

pub struct WikidataClient {
    http: Client,
    config: ClientConfig,
}

impl WikidataClient {
    pub fn new(config: ClientConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("necrograph")),
        );
        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Network(format!("failed to build http client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn pause(&self) {
        if !self.config.courtesy_delay.is_zero() {
            thread::sleep(self.config.courtesy_delay);
        }
    }

    /// One `wbgetentities` round trip, followed by the courtesy pause.
    fn get_entities(
        &self,
        ids: &[EntityId],
        extra: &[(&str, &str)],
    ) -> Result<EntityLookupResponse, StoreError> {
        let joined = ids
            .iter()
            .map(EntityId::as_str)
            .collect::<Vec<_>>()
            .join("|");
        let mut params: Vec<(&str, &str)> = vec![
            ("action", "wbgetentities"),
            ("ids", &joined),
            ("format", "json"),
        ];
        params.extend_from_slice(extra);

        let result = self.send(&params);
        self.pause();
        result
    }

    fn send(&self, params: &[(&str, &str)]) -> Result<EntityLookupResponse, StoreError> {
        let response = self
            .http
            .get(&self.config.api_url)
            .query(params)
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: body.chars().take(300).collect(),
            });
        }
        let parsed: EntityLookupResponse = response
            .json()
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        // MediaWiki reports API-level failures in-band with a 200.
        if let Some(error) = parsed.error {
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: format!("{}: {}", error.code, error.info),
            });
        }
        Ok(parsed)
    }
}

impl EntityStore for WikidataClient {
    fn entities(&self, ids: &[EntityId]) -> Result<HashMap<EntityId, RawEntityRecord>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let response = self.get_entities(
            ids,
            &[
                ("props", "labels|claims"),
                ("languages", &self.config.language),
            ],
        )?;
        let mut records = HashMap::new();
        for (key, record) in response.entities {
            if record.is_missing() {
                continue;
            }
            match EntityId::parse(&record.id) {
                Ok(id) => {
                    records.insert(id, record);
                }
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "skipping entity with odd id");
                }
            }
        }
        Ok(records)
    }

    fn sitelink(&self, id: &EntityId, site: &str) -> Result<Option<String>, StoreError> {
        let response = self.get_entities(
            std::slice::from_ref(id),
            &[("props", "sitelinks"), ("sitefilter", site)],
        )?;
        Ok(response
            .entities
            .into_values()
            .find(|record| !record.is_missing())
            .and_then(|record| record.sitelink_title(site).map(str::to_string)))
    }
}

#[derive(Debug, Deserialize)]
struct EntityLookupResponse {
    #[serde(default)]
    entities: HashMap<String, RawEntityRecord>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}
