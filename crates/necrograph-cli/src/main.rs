//! Necrograph CLI
//!
//! Unified command-line interface for:
//! - Harvesting candidate people from the Wikidata Query Service (`harvest`)
//! - Enriching candidates through the Wikidata API into relevance-filtered
//!   JSON snapshots (`enrich`)

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use necrograph_enrich::{
    load_candidates, load_snapshot, CheckpointWriter, EnrichmentPipeline, PipelineConfig,
    DEFAULT_BATCH_SIZE, DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_FETCH_BATCH_SIZE,
    DEFAULT_MAX_ADMIN_DEPTH, DEFAULT_MULTI_VALUE_CAP, DEFAULT_WIKI,
};
use necrograph_model::DEFAULT_MIN_OPTIONAL_FIELDS;
use necrograph_wikidata::client::{
    DEFAULT_API_URL, DEFAULT_COURTESY_DELAY_MS, DEFAULT_LANGUAGE, DEFAULT_USER_AGENT,
};
use necrograph_wikidata::harvest::{CAUSE_OF_DEATH_QUERY, DEFAULT_PAGE_SIZE, DEFAULT_SPARQL_ENDPOINT};
use necrograph_wikidata::{client, harvest, ClientConfig, HarvesterConfig, SparqlHarvester, WikidataClient};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "necrograph")]
#[command(
    author,
    version,
    about = "Necrograph: harvest and enrich Wikidata person records"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest candidate people into a CSV file.
    ///
    /// Pages the cause-of-death query through the public Query Service
    /// (humans with a recorded cause of death and an English Wikipedia
    /// article) until a page comes back empty.
    Harvest(HarvestArgs),

    /// Enrich harvested candidates into a JSON snapshot.
    ///
    /// Fetches each candidate's claims from the Wikidata API, resolves
    /// labels and places, keeps the relevant records, and checkpoints
    /// progress along the way.
    Enrich(EnrichArgs),
}

#[derive(Args)]
struct HarvestArgs {
    /// Output CSV path.
    #[arg(short, long, default_value = "people_raw.csv")]
    out: PathBuf,

    /// SPARQL endpoint.
    #[arg(long, default_value = DEFAULT_SPARQL_ENDPOINT)]
    endpoint: String,

    /// Run this query instead of the built-in cause-of-death one. The file
    /// must not carry its own LIMIT/OFFSET; paging appends them.
    #[arg(long)]
    query_file: Option<PathBuf>,

    /// Rows requested per page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Stop after this many pages (a full harvest runs to exhaustion).
    #[arg(long)]
    max_pages: Option<usize>,

    /// Backoff before retrying a failed page, in seconds.
    #[arg(long, default_value_t = harvest::DEFAULT_RETRY_DELAY_SECS)]
    retry_delay_secs: u64,

    /// Pause between successive pages, in seconds.
    #[arg(long, default_value_t = harvest::DEFAULT_PAGE_DELAY_SECS)]
    page_delay_secs: u64,

    /// HTTP User-Agent.
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = harvest::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

#[derive(Args)]
struct EnrichArgs {
    /// Candidate JSON file: an array of objects carrying `person` (entity
    /// URI or bare Q-id), `causeOfDeath`, and `causeOfDeathLabel`.
    #[arg(short, long)]
    input: PathBuf,

    /// Final snapshot path. Limited runs append `_<limit>` to the stem;
    /// progress checkpoints append `_progress_<batch>`.
    #[arg(short, long, default_value = "people_enriched.json")]
    out: PathBuf,

    /// Enrich at most this many candidates.
    #[arg(long)]
    limit: Option<usize>,

    /// Seed from an earlier snapshot and skip its ids.
    #[arg(long)]
    resume_from: Option<PathBuf>,

    /// Candidates per working batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Entity ids per API request.
    #[arg(long, default_value_t = DEFAULT_FETCH_BATCH_SIZE)]
    fetch_batch_size: usize,

    /// Batches between progress checkpoints (0 disables them).
    #[arg(long, default_value_t = DEFAULT_CHECKPOINT_INTERVAL)]
    checkpoint_interval: usize,

    /// Optional fields a record needs beyond label, dates, and photo.
    #[arg(long, default_value_t = DEFAULT_MIN_OPTIONAL_FIELDS)]
    min_optional_fields: usize,

    /// Values kept per multi-valued property (citizenship, occupation).
    #[arg(long, default_value_t = DEFAULT_MULTI_VALUE_CAP)]
    multi_value_cap: usize,

    /// Admin-hierarchy hops when resolving a place's country.
    #[arg(long, default_value_t = DEFAULT_MAX_ADMIN_DEPTH)]
    max_admin_depth: usize,

    /// Label language.
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// Sitelink wiki for article URLs.
    #[arg(long, default_value = DEFAULT_WIKI)]
    wiki: String,

    /// Wikidata API endpoint.
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Courtesy pause after every API call, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_COURTESY_DELAY_MS)]
    delay_ms: u64,

    /// HTTP User-Agent.
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = client::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

fn main() -> Result<()> {
    // Batch progress and checkpoint writes log at info from the enrich
    // crate; everything else stays quiet unless RUST_LOG says otherwise.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,necrograph_enrich=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Harvest(args) => cmd_harvest(args)?,
        Commands::Enrich(args) => cmd_enrich(args)?,
    }
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_harvest(args: HarvestArgs) -> Result<()> {
    println!("{}", "Harvesting candidates".green().bold());
    println!(
        "  endpoint={} page_size={} max_pages={}",
        args.endpoint,
        args.page_size,
        args.max_pages
            .map_or_else(|| "none".to_string(), |n| n.to_string())
    );

    let query = match &args.query_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("read query file {}", path.display()))?,
        None => CAUSE_OF_DEATH_QUERY.to_string(),
    };

    let harvester = SparqlHarvester::new(HarvesterConfig {
        endpoint: args.endpoint,
        user_agent: args.user_agent,
        timeout: Duration::from_secs(args.timeout_secs),
        page_size: args.page_size,
        retry_delay: Duration::from_secs(args.retry_delay_secs),
        page_delay: Duration::from_secs(args.page_delay_secs),
        max_pages: args.max_pages,
    })?;

    let file = fs::File::create(&args.out)
        .with_context(|| format!("create {}", args.out.display()))?;
    let mut writer = BufWriter::new(file);
    let report = harvester.run(&query, &mut writer)?;
    writer.flush()?;

    println!(
        "  {} pages={} rows={}",
        "→".yellow(),
        report.pages,
        report.data_rows
    );
    println!("  {} {}", "→".cyan(), args.out.display());
    Ok(())
}

fn cmd_enrich(args: EnrichArgs) -> Result<()> {
    println!("{}", "Enriching candidates".green().bold());

    let candidates = load_candidates(&args.input)?;
    println!(
        "  candidates={} batch_size={} limit={}",
        candidates.len(),
        args.batch_size,
        args.limit
            .map_or_else(|| "none".to_string(), |n| n.to_string())
    );

    let seed = match &args.resume_from {
        Some(path) => {
            let seed = load_snapshot(path)?;
            println!("  resuming {} records from {}", seed.len(), path.display());
            seed
        }
        None => Vec::new(),
    };

    let store = WikidataClient::new(ClientConfig {
        api_url: args.api_url,
        user_agent: args.user_agent,
        timeout: Duration::from_secs(args.timeout_secs),
        courtesy_delay: Duration::from_millis(args.delay_ms),
        language: args.language.clone(),
    })?;

    let checkpoints = CheckpointWriter::new(&args.out, args.limit);
    let mut pipeline = EnrichmentPipeline::new(
        store,
        PipelineConfig {
            batch_size: args.batch_size,
            fetch_batch_size: args.fetch_batch_size,
            checkpoint_interval: args.checkpoint_interval,
            limit: args.limit,
            max_admin_depth: args.max_admin_depth,
            multi_value_cap: args.multi_value_cap,
            min_optional_fields: args.min_optional_fields,
            language: args.language,
            wiki: args.wiki,
        },
    );
    let report = pipeline.run(&candidates, seed, &checkpoints)?;

    println!(
        "  {} processed={} fetched={} accepted={}",
        "→".yellow(),
        report.candidates,
        report.fetched,
        report.accepted
    );
    println!(
        "  {} photo={} coords={} article={} citizenship={} occupation={}",
        "→".yellow(),
        report.with_photo,
        report.with_coords,
        report.with_article,
        report.with_citizenship,
        report.with_occupation
    );
    println!(
        "  {} batches={} checkpoints={}",
        "→".yellow(),
        report.batches,
        report.checkpoints
    );
    println!("  {} {}", "→".cyan(), checkpoints.final_path().display());
    Ok(())
}
