//! The enrichment pipeline.

use crate::checkpoint::CheckpointWriter;
use crate::fetch::{BatchFetcher, DEFAULT_FETCH_BATCH_SIZE};
use crate::input::CandidateRow;
use crate::resolve::{PlaceResolver, ResolutionCache, DEFAULT_MAX_ADMIN_DEPTH};
use necrograph_model::{
    EntityId, RelevancePolicy, ResolvedPerson, DEFAULT_MIN_OPTIONAL_FIELDS, MULTI_VALUE_SEPARATOR,
};
use necrograph_wikidata::client::DEFAULT_LANGUAGE;
use necrograph_wikidata::{properties, urls, EntityStore, RawEntityRecord};
use std::collections::HashSet;
use std::path::PathBuf;

/// Candidates enriched per working batch.
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Batches between progress checkpoints.
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 100;

/// Values kept per multi-valued property (citizenship, occupation). Each
/// extra value can cost a label lookup, so the cap bounds API traffic.
pub const DEFAULT_MULTI_VALUE_CAP: usize = 3;

/// Sitelink used for article URLs.
pub const DEFAULT_WIKI: &str = "enwiki";

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("candidate file {}: {}", .path.display(), .message)]
    Candidates { path: PathBuf, message: String },
    #[error("snapshot {}: {}", .path.display(), .source)]
    Checkpoint {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Every knob of the run, with the defaults the production harvest uses.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Candidates per working batch.
    pub batch_size: usize,
    /// Ids per `wbgetentities` request within a batch.
    pub fetch_batch_size: usize,
    /// Write a checkpoint after every this-many batches (0 disables).
    pub checkpoint_interval: usize,
    /// Enrich at most this many candidates.
    pub limit: Option<usize>,
    /// Admin-hierarchy hops when resolving a place's country.
    pub max_admin_depth: usize,
    /// Values kept per multi-valued property.
    pub multi_value_cap: usize,
    /// Optional fields required for relevance.
    pub min_optional_fields: usize,
    /// Label language.
    pub language: String,
    /// Sitelink wiki for article URLs.
    pub wiki: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            fetch_batch_size: DEFAULT_FETCH_BATCH_SIZE,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            limit: None,
            max_admin_depth: DEFAULT_MAX_ADMIN_DEPTH,
            multi_value_cap: DEFAULT_MULTI_VALUE_CAP,
            min_optional_fields: DEFAULT_MIN_OPTIONAL_FIELDS,
            language: DEFAULT_LANGUAGE.to_string(),
            wiki: DEFAULT_WIKI.to_string(),
        }
    }
}

/// End-of-run accounting, in the shape the summary output reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    /// Candidates actually enriched this run (after limit and resume skip).
    pub candidates: usize,
    /// Records the store returned (missing entities excluded).
    pub fetched: usize,
    /// Records in the final snapshot, seeded ones included.
    pub accepted: usize,
    /// Records carried in from a resume seed.
    pub resumed: usize,
    pub with_photo: usize,
    pub with_coords: usize,
    pub with_article: usize,
    pub with_citizenship: usize,
    pub with_occupation: usize,
    pub batches: usize,
    pub checkpoints: usize,
}

impl EnrichmentReport {
    fn tally(&mut self, person: &ResolvedPerson) {
        if !person.photo.is_empty() {
            self.with_photo += 1;
        }
        if !person.coords.is_empty() {
            self.with_coords += 1;
        }
        if !person.article.is_empty() {
            self.with_article += 1;
        }
        if !person.citizenship.is_empty() {
            self.with_citizenship += 1;
        }
        if !person.occupation.is_empty() {
            self.with_occupation += 1;
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Single-threaded enrichment over an [`EntityStore`].
///
/// The pipeline owns its caches and resolvers; politeness (the courtesy
/// delay) lives in the store implementation, so every remote call is paced
/// no matter which component makes it.
pub struct EnrichmentPipeline<S: EntityStore> {
    store: S,
    config: PipelineConfig,
    cache: ResolutionCache,
    resolver: PlaceResolver,
    fetcher: BatchFetcher,
    policy: RelevancePolicy,
}

impl<S: EntityStore> EnrichmentPipeline<S> {
    pub fn new(store: S, config: PipelineConfig) -> Self {
        let cache = ResolutionCache::new(config.language.clone());
        let resolver = PlaceResolver {
            max_admin_depth: config.max_admin_depth,
        };
        let fetcher = BatchFetcher::new(config.fetch_batch_size);
        let policy = RelevancePolicy {
            min_optional_fields: config.min_optional_fields,
        };
        Self {
            store,
            config,
            cache,
            resolver,
            fetcher,
            policy,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Enrich `candidates`, appending accepted records after any `seed`
    /// carried over from a resumed snapshot.
    ///
    /// The accepted list is append-only: records are filtered once, on
    /// assembly, and never re-judged. Checkpoints land after every
    /// `checkpoint_interval`-th batch and a final snapshot is always
    /// written, so each snapshot is a superset of every earlier one.
    pub fn run(
        &mut self,
        candidates: &[CandidateRow],
        seed: Vec<ResolvedPerson>,
        checkpoints: &CheckpointWriter,
    ) -> Result<EnrichmentReport, PipelineError> {
        let mut accepted = seed;
        let already_enriched: HashSet<String> =
            accepted.iter().map(|person| person.person.clone()).collect();

        // The limit bounds the candidate window first; resumed ids are then
        // skipped inside it, so a restarted limited run reprocesses the same
        // window instead of sliding past it.
        let mut window: Vec<&CandidateRow> = candidates.iter().collect();
        if let Some(limit) = self.config.limit {
            window.truncate(limit);
        }
        let pending: Vec<&CandidateRow> = window
            .into_iter()
            .filter(|row| !already_enriched.contains(&row.id.entity_uri()))
            .collect();

        let mut report = EnrichmentReport {
            candidates: pending.len(),
            resumed: accepted.len(),
            ..Default::default()
        };
        for person in &accepted {
            report.tally(person);
        }

        for batch in pending.chunks(self.config.batch_size.max(1)) {
            let ids: Vec<EntityId> = batch.iter().map(|row| row.id.clone()).collect();
            let records = self.fetcher.fetch(&self.store, &ids);

            for row in batch {
                let Some(record) = records.get(&row.id) else {
                    continue;
                };
                if record.is_missing() {
                    continue;
                }
                report.fetched += 1;
                let person = self.assemble(row, record);
                if self.policy.is_relevant(&person) {
                    report.tally(&person);
                    accepted.push(person);
                }
            }

            report.batches += 1;
            tracing::info!(
                batch = report.batches,
                fetched = report.fetched,
                accepted = accepted.len(),
                "batch enriched"
            );
            if self.config.checkpoint_interval > 0
                && report.batches % self.config.checkpoint_interval == 0
            {
                checkpoints.write_progress(report.batches, &accepted)?;
                report.checkpoints += 1;
            }
        }

        checkpoints.write_final(&accepted)?;
        report.accepted = accepted.len();
        Ok(report)
    }

    /// Build one output record from a fetched entity and its candidate row.
    fn assemble(&mut self, row: &CandidateRow, record: &RawEntityRecord) -> ResolvedPerson {
        let cap = self.config.multi_value_cap;

        let person_label = record
            .label(&self.config.language)
            .unwrap_or_default()
            .to_string();
        let birth_date = record
            .time_claim(properties::BIRTH_DATE)
            .unwrap_or_default()
            .to_string();
        let death_date = record
            .time_claim(properties::DEATH_DATE)
            .unwrap_or_default()
            .to_string();
        let photo = record
            .string_claim(properties::IMAGE)
            .and_then(urls::commons_file_url)
            .unwrap_or_default();
        let coords = record
            .coordinate_claim(properties::COORDINATES)
            .unwrap_or_default();
        let gender = record
            .entity_claim(properties::GENDER)
            .and_then(|id| self.cache.label(&self.store, &id))
            .unwrap_or_default();
        let place_of_birth = record
            .entity_claim(properties::PLACE_OF_BIRTH)
            .map(|id| self.cache.place(&self.store, &self.resolver, &id))
            .unwrap_or_default();
        let place_of_death = record
            .entity_claim(properties::PLACE_OF_DEATH)
            .map(|id| self.cache.place(&self.store, &self.resolver, &id))
            .unwrap_or_default();
        let citizenship = self.join_labels(&record.entity_claims(properties::CITIZENSHIP, cap));
        let occupation = self.join_labels(&record.entity_claims(properties::OCCUPATION, cap));
        let article = match self.store.sitelink(&row.id, &self.config.wiki) {
            Ok(Some(title)) => urls::wikipedia_article_url(&title).unwrap_or_default(),
            Ok(None) => String::new(),
            Err(err) => {
                tracing::warn!(id = %row.id, error = %err, "sitelink lookup failed");
                String::new()
            }
        };

        ResolvedPerson {
            person: row.id.entity_uri(),
            person_label,
            birth_date,
            death_date,
            photo,
            coords,
            place_of_birth,
            place_of_death,
            citizenship,
            occupation,
            gender,
            article,
            cause_of_death: row.cause_of_death.clone(),
            cause_of_death_label: row.cause_of_death_label.clone(),
        }
    }

    fn join_labels(&mut self, ids: &[EntityId]) -> String {
        let labels: Vec<String> = ids
            .iter()
            .filter_map(|id| self.cache.label(&self.store, id))
            .filter(|label| !label.is_empty())
            .collect();
        labels.join(MULTI_VALUE_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use necrograph_wikidata::StoreError;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct ScriptedStore {
        records: HashMap<EntityId, RawEntityRecord>,
        sitelinks: HashMap<EntityId, String>,
        fetched_ids: RefCell<Vec<EntityId>>,
    }

    impl ScriptedStore {
        fn new() -> Self {
            Self {
                records: HashMap::new(),
                sitelinks: HashMap::new(),
                fetched_ids: RefCell::new(Vec::new()),
            }
        }

        fn insert(&mut self, value: serde_json::Value) {
            let record: RawEntityRecord = serde_json::from_value(value).expect("record json");
            let id = EntityId::parse(&record.id).expect("record id");
            self.records.insert(id, record);
        }
    }

    impl EntityStore for ScriptedStore {
        fn entities(
            &self,
            ids: &[EntityId],
        ) -> Result<HashMap<EntityId, RawEntityRecord>, StoreError> {
            let mut out = HashMap::new();
            for id in ids {
                self.fetched_ids.borrow_mut().push(id.clone());
                if let Some(record) = self.records.get(id) {
                    out.insert(id.clone(), record.clone());
                }
            }
            Ok(out)
        }

        fn sitelink(&self, id: &EntityId, _site: &str) -> Result<Option<String>, StoreError> {
            Ok(self.sitelinks.get(id).cloned())
        }
    }

    fn id(s: &str) -> EntityId {
        EntityId::parse(s).unwrap()
    }

    fn row(s: &str) -> CandidateRow {
        CandidateRow {
            id: id(s),
            cause_of_death: "http://www.wikidata.org/entity/Q18556".to_string(),
            cause_of_death_label: "scripted cause".to_string(),
        }
    }

    fn entity_snak(id: &str) -> serde_json::Value {
        json!({ "mainsnak": { "snaktype": "value",
            "datavalue": { "type": "wikibase-entityid", "value": { "id": id } } } })
    }

    /// A person record with label, both dates, and a photo.
    fn person_record(id: &str, label: &str, extra_claims: serde_json::Value) -> serde_json::Value {
        let mut claims = json!({
            "P569": [{ "mainsnak": { "snaktype": "value",
                "datavalue": { "type": "time", "value": { "time": "+1900-01-01T00:00:00Z" } } } }],
            "P570": [{ "mainsnak": { "snaktype": "value",
                "datavalue": { "type": "time", "value": { "time": "+1980-01-01T00:00:00Z" } } } }],
            "P18": [{ "mainsnak": { "snaktype": "value",
                "datavalue": { "type": "string", "value": format!("{label} portrait.jpg") } } }]
        });
        if let (Some(claims_map), Some(extra_map)) =
            (claims.as_object_mut(), extra_claims.as_object())
        {
            for (key, value) in extra_map {
                claims_map.insert(key.clone(), value.clone());
            }
        }
        json!({
            "id": id,
            "labels": { "en": { "language": "en", "value": label } },
            "claims": claims
        })
    }

    fn labeled(id: &str, label: &str) -> serde_json::Value {
        json!({ "id": id, "labels": { "en": { "language": "en", "value": label } } })
    }

    #[test]
    fn assembles_the_full_record() {
        let mut store = ScriptedStore::new();
        store.insert(person_record(
            "Q42",
            "Douglas Adams",
            json!({
                "P21": [entity_snak("Q6581097")],
                "P27": [entity_snak("Q145")],
                "P106": [entity_snak("Q36180"), entity_snak("Q49757"), entity_snak("Q18844224"), entity_snak("Q245068")],
                "P625": [{ "mainsnak": { "snaktype": "value",
                    "datavalue": { "type": "globecoordinate",
                        "value": { "latitude": 51.5, "longitude": -0.1 } } } }]
            }),
        ));
        store.insert(labeled("Q6581097", "male"));
        store.insert(labeled("Q145", "United Kingdom"));
        store.insert(labeled("Q36180", "writer"));
        store.insert(labeled("Q49757", "poet"));
        store.insert(labeled("Q18844224", "science fiction writer"));
        store.insert(labeled("Q245068", "comedian"));
        store
            .sitelinks
            .insert(id("Q42"), "Douglas Adams".to_string());

        let mut pipeline = EnrichmentPipeline::new(&store, PipelineConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let writer = CheckpointWriter::new(&dir.path().join("out.json"), None);
        let report = pipeline.run(&[row("Q42")], Vec::new(), &writer).unwrap();

        assert_eq!(report.candidates, 1);
        assert_eq!(report.fetched, 1);
        assert_eq!(report.accepted, 1);
        let people = crate::checkpoint::load_snapshot(&writer.final_path()).unwrap();
        let person = &people[0];
        assert_eq!(person.person, "http://www.wikidata.org/entity/Q42");
        assert_eq!(person.person_label, "Douglas Adams");
        assert_eq!(person.birth_date, "+1900-01-01T00:00:00Z");
        assert_eq!(
            person.photo,
            "https://commons.wikimedia.org/wiki/File:Douglas_Adams_portrait.jpg"
        );
        assert_eq!(person.coords, "Point(-0.1 51.5)");
        assert_eq!(person.gender, "male");
        assert_eq!(person.citizenship, "United Kingdom");
        // Four occupation claims, capped at three values.
        assert_eq!(person.occupation, "writer|poet|science fiction writer");
        assert_eq!(person.article, "https://en.wikipedia.org/wiki/Douglas_Adams");
        assert_eq!(person.cause_of_death_label, "scripted cause");
    }

    #[test]
    fn missing_and_unknown_entities_are_skipped() {
        let mut store = ScriptedStore::new();
        store.insert(person_record("Q1", "Kept Person", json!({
            "P21": [entity_snak("Q6581072")],
            "P27": [entity_snak("Q142")]
        })));
        store.insert(labeled("Q6581072", "female"));
        store.insert(labeled("Q142", "France"));
        store.insert(json!({ "id": "Q2", "missing": "" }));

        let mut pipeline = EnrichmentPipeline::new(&store, PipelineConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let writer = CheckpointWriter::new(&dir.path().join("out.json"), None);
        let report = pipeline
            .run(&[row("Q1"), row("Q2"), row("Q3")], Vec::new(), &writer)
            .unwrap();

        assert_eq!(report.candidates, 3);
        assert_eq!(report.fetched, 1);
        assert_eq!(report.accepted, 1);
    }

    #[test]
    fn limit_bounds_the_candidate_window() {
        let mut store = ScriptedStore::new();
        for i in 1..=5 {
            store.insert(labeled(&format!("Q{i}"), "Somebody"));
        }
        let config = PipelineConfig {
            limit: Some(2),
            ..Default::default()
        };
        let mut pipeline = EnrichmentPipeline::new(&store, config);
        let dir = tempfile::tempdir().unwrap();
        let writer = CheckpointWriter::new(&dir.path().join("out.json"), Some(2));
        let rows: Vec<CandidateRow> = (1..=5).map(|i| row(&format!("Q{i}"))).collect();
        let report = pipeline.run(&rows, Vec::new(), &writer).unwrap();
        assert_eq!(report.candidates, 2);
        let fetched = store.fetched_ids.borrow();
        assert!(fetched.contains(&id("Q1")));
        assert!(fetched.contains(&id("Q2")));
        assert!(!fetched.contains(&id("Q3")));
        assert_eq!(writer.final_path(), dir.path().join("out_2.json"));
    }

    #[test]
    fn resume_seed_skips_already_enriched_ids() {
        let mut store = ScriptedStore::new();
        store.insert(person_record("Q2", "New Person", json!({
            "P21": [entity_snak("Q6581097")],
            "P27": [entity_snak("Q142")]
        })));
        store.insert(labeled("Q6581097", "male"));
        store.insert(labeled("Q142", "France"));

        let seed = vec![ResolvedPerson {
            person: "http://www.wikidata.org/entity/Q1".to_string(),
            person_label: "Seeded Person".to_string(),
            birth_date: "+1900-01-01T00:00:00Z".to_string(),
            death_date: "+1980-01-01T00:00:00Z".to_string(),
            photo: "https://commons.wikimedia.org/wiki/File:Seeded.jpg".to_string(),
            gender: "female".to_string(),
            article: "https://en.wikipedia.org/wiki/Seeded_Person".to_string(),
            ..Default::default()
        }];

        let mut pipeline = EnrichmentPipeline::new(&store, PipelineConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let writer = CheckpointWriter::new(&dir.path().join("out.json"), None);
        let report = pipeline
            .run(&[row("Q1"), row("Q2")], seed, &writer)
            .unwrap();

        assert_eq!(report.resumed, 1);
        assert_eq!(report.candidates, 1);
        assert_eq!(report.accepted, 2);
        assert!(!store.fetched_ids.borrow().contains(&id("Q1")));
        let people = crate::checkpoint::load_snapshot(&writer.final_path()).unwrap();
        assert_eq!(people[0].person_label, "Seeded Person");
        assert_eq!(people[1].person_label, "New Person");
    }

    #[test]
    fn checkpoints_follow_the_interval() {
        let mut store = ScriptedStore::new();
        for i in 1..=5 {
            store.insert(labeled(&format!("Q{i}"), "Somebody"));
        }
        let config = PipelineConfig {
            batch_size: 1,
            checkpoint_interval: 2,
            ..Default::default()
        };
        let mut pipeline = EnrichmentPipeline::new(&store, config);
        let dir = tempfile::tempdir().unwrap();
        let writer = CheckpointWriter::new(&dir.path().join("out.json"), None);
        let rows: Vec<CandidateRow> = (1..=5).map(|i| row(&format!("Q{i}"))).collect();
        let report = pipeline.run(&rows, Vec::new(), &writer).unwrap();

        assert_eq!(report.batches, 5);
        assert_eq!(report.checkpoints, 2);
        // Five batches at interval 2: checkpoints after batches 2 and 4.
        assert!(writer.progress_path(2).exists());
        assert!(writer.progress_path(4).exists());
        assert!(!writer.progress_path(1).exists());
        assert!(!writer.progress_path(3).exists());
        assert!(!writer.progress_path(5).exists());
        assert!(writer.final_path().exists());
    }

    #[test]
    fn rejected_records_never_enter_the_output() {
        let mut store = ScriptedStore::new();
        // Label and dates but no photo: required field missing.
        store.insert(json!({
            "id": "Q1",
            "labels": { "en": { "language": "en", "value": "No Photo" } },
            "claims": {
                "P569": [{ "mainsnak": { "snaktype": "value",
                    "datavalue": { "type": "time", "value": { "time": "+1900-01-01T00:00:00Z" } } } }],
                "P570": [{ "mainsnak": { "snaktype": "value",
                    "datavalue": { "type": "time", "value": { "time": "+1980-01-01T00:00:00Z" } } } }]
            }
        }));
        let mut pipeline = EnrichmentPipeline::new(&store, PipelineConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let writer = CheckpointWriter::new(&dir.path().join("out.json"), None);
        let report = pipeline.run(&[row("Q1")], Vec::new(), &writer).unwrap();
        assert_eq!(report.fetched, 1);
        assert_eq!(report.accepted, 0);
        let people = crate::checkpoint::load_snapshot(&writer.final_path()).unwrap();
        assert!(people.is_empty());
    }
}
