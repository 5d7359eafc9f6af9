//! Paginated SPARQL harvesting.
//!
//! The harvester walks a query through the public endpoint in
//! `LIMIT`/`OFFSET` pages, requesting CSV, and appends rows to a
//! caller-supplied writer. Two policies are load-bearing here and are the
//! opposite of the enrichment side's:
//! - a failed page is retried until it succeeds (a skipped page would
//!   silently truncate the harvest),
//! - pagination stops on the first page with no data rows.
//!
//! Each page after the first drops its own CSV header so the output is one
//! well-formed file.

use crate::store::StoreError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::io::Write;
use std::thread;
use std::time::Duration;

/// Wikidata Query Service endpoint.
pub const DEFAULT_SPARQL_ENDPOINT: &str = "https://query.wikidata.org/sparql";

/// Rows requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 5000;

/// Backoff before retrying a failed page, in seconds.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 10;

/// Pause between successive pages, in seconds.
pub const DEFAULT_PAGE_DELAY_SECS: u64 = 1;

/// Per-request timeout in seconds. Query service requests are heavier than
/// API lookups, so this is deliberately generous.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Candidate harvest: humans with a cause of death and an English Wikipedia
/// article, labels resolved server-side.
pub const CAUSE_OF_DEATH_QUERY: &str = r#"SELECT ?person ?personLabel ?article
       ?birthDate ?deathDate
       ?placeOfBirthLabel ?placeOfDeathLabel
       ?causeOfDeath ?causeOfDeathLabel
       ?citizenshipLabel ?occupationLabel ?genderLabel
       ?coords
WHERE {
  ?person wdt:P31 wd:Q5 .
  ?person wdt:P509 ?causeOfDeath .
  ?article schema:about ?person ;
           schema:isPartOf <https://en.wikipedia.org/> .

  OPTIONAL { ?person wdt:P569 ?birthDate . }
  OPTIONAL { ?person wdt:P570 ?deathDate . }
  OPTIONAL { ?person wdt:P19 ?placeOfBirth . }
  OPTIONAL { ?person wdt:P20 ?placeOfDeath . }
  OPTIONAL { ?person wdt:P27 ?citizenship . }
  OPTIONAL { ?person wdt:P106 ?occupation . }
  OPTIONAL { ?person wdt:P21 ?gender . }
  OPTIONAL { ?person wdt:P19/wdt:P625 ?coords . }

  SERVICE wikibase:label { bd:serviceParam wikibase:language "en" . }
}"#;

#[derive(Debug, Clone)]
pub struct HarvesterConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub page_size: usize,
    pub retry_delay: Duration,
    pub page_delay: Duration,
    /// Stop after this many pages regardless of results (testing aid).
    pub max_pages: Option<usize>,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SPARQL_ENDPOINT.to_string(),
            user_agent: crate::client::DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            page_delay: Duration::from_secs(DEFAULT_PAGE_DELAY_SECS),
            max_pages: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("write output: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Pages fetched, including the terminal empty one.
    pub pages: usize,
    /// Data rows written (header excluded).
    pub data_rows: usize,
}

// ============================================================================
// Harvester
// ============================================================================

pub struct SparqlHarvester {
    http: Client,
    config: HarvesterConfig,
}

impl SparqlHarvester {
    pub fn new(config: HarvesterConfig) -> Result<Self, HarvestError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("necrograph")),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("text/csv"));
        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| HarvestError::Client(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Page `query` to completion, appending CSV rows to `out`.
    pub fn run(&self, query: &str, out: &mut dyn Write) -> Result<HarvestReport, HarvestError> {
        let mut report = HarvestReport::default();
        let mut offset = 0usize;
        loop {
            if let Some(max) = self.config.max_pages {
                if report.pages >= max {
                    break;
                }
            }
            let paged = format!(
                "{query}\nLIMIT {}\nOFFSET {offset}",
                self.config.page_size
            );
            let body = self.fetch_page(&paged, offset);
            let rows = write_page(&body, report.pages == 0, out)?;
            report.pages += 1;
            report.data_rows += rows;
            if rows == 0 {
                break;
            }
            offset += self.config.page_size;
            thread::sleep(self.config.page_delay);
        }
        Ok(report)
    }

    /// Fetch one page, retrying with a fixed backoff until it succeeds.
    fn fetch_page(&self, query: &str, offset: usize) -> String {
        loop {
            match self.try_fetch(query) {
                Ok(body) => return body,
                Err(err) => {
                    tracing::warn!(
                        offset,
                        retry_secs = self.config.retry_delay.as_secs(),
                        error = %err,
                        "sparql page failed; retrying"
                    );
                    thread::sleep(self.config.retry_delay);
                }
            }
        }
    }

    fn try_fetch(&self, query: &str) -> Result<String, StoreError> {
        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&[("query", query)])
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
        response.text().map_err(|e| StoreError::Network(e.to_string()))
    }
}

/// Append one CSV page to `out`, returning the number of data rows written.
///
/// The first line of every page is its header; only the first page keeps it.
fn write_page(body: &str, first_page: bool, out: &mut dyn Write) -> std::io::Result<usize> {
    let mut rows = 0usize;
    for (index, line) in body.lines().enumerate() {
        if index == 0 {
            if first_page && !line.trim().is_empty() {
                writeln!(out, "{line}")?;
            }
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        writeln!(out, "{line}")?;
        rows += 1;
    }
    Ok(rows)
}
