use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ram_search::config::{load_config, validate_config, Config, ConfigLoader, SearchConfig};
use ram_search::{
    parse_address, Address, ComparisonType, FilterType, MemSize, MemoryImage, SearchFilter,
    SearchMatch, SearchSession, WordType,
};

/// Replays a chain of filters over memory snapshots and reports what is left
#[derive(Debug, Parser)]
#[command(name = "ram-search", version, about)]
struct Args {
    /// Configuration file (defaults to ram-search.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// TOML script describing the capture and the filter steps
    script: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Script {
    word_type: Option<WordType>,
    start_address: Option<String>,
    byte_count: Option<u64>,
    /// Address the first byte of every snapshot file is loaded at
    snapshot_base: Option<String>,
    /// Size of the memory space; defaults to the end of the snapshot
    memory_size: Option<u64>,
    initial_snapshot: PathBuf,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    snapshot: PathBuf,
    filter_type: FilterType,
    #[serde(default)]
    comparison: ComparisonType,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Serialize)]
struct Report {
    word_type: WordType,
    summary: String,
    total_matches: usize,
    matches: Vec<ReportEntry>,
}

#[derive(Debug, Serialize)]
struct ReportEntry {
    address: String,
    mem_size: MemSize,
    value: u32,
    formatted: String,
    bytes: String,
}

impl ReportEntry {
    fn new(session: &SearchSession, m: SearchMatch) -> Self {
        let mut bytes = vec![0u8; m.mem_size.byte_count()];
        session.get_bytes(m.address, &mut bytes);

        ReportEntry {
            address: m.address.to_string(),
            mem_size: m.mem_size,
            value: m.value,
            formatted: session.formatted_value(m.address, m.mem_size),
            bytes: hex::encode(bytes),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConfigLoader::new(path)
            .load()
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => load_config()?,
    };
    validate_config(&config)?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.logging.with_target)
        .init();

    info!("Starting RAM-Search v{}", env!("CARGO_PKG_VERSION"));

    let contents = tokio::fs::read_to_string(&args.script)
        .await
        .with_context(|| format!("failed to read script {}", args.script.display()))?;
    let script: Script = toml::from_str(&contents)
        .with_context(|| format!("failed to parse script {}", args.script.display()))?;
    let base_dir = args
        .script
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    // filter passes are CPU bound; keep them off the async workers
    let report = tokio::task::spawn_blocking(move || run_script(&config, script, &base_dir))
        .await
        .context("search worker panicked")??;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_script(config: &Config, script: Script, base_dir: &Path) -> Result<Report> {
    let search: &SearchConfig = &config.search;
    let word_type = script.word_type.unwrap_or(search.word_type);
    let start = match &script.start_address {
        Some(address) => parse_address(address)?,
        None => search.start()?,
    };
    let byte_count = script.byte_count.unwrap_or(search.byte_count);
    let base = match &script.snapshot_base {
        Some(address) => parse_address(address)?,
        None => Address::new(0),
    };
    let load = |path: &Path| load_snapshot(&base_dir.join(path), base, script.memory_size);

    let image = load(script.initial_snapshot.as_path())?;

    let mut session = SearchSession::fresh(&image, start, byte_count, word_type);
    info!("{}", session.summary());

    for (index, step) in script.steps.iter().enumerate() {
        let live = load(step.snapshot.as_path())?;
        let filter = SearchFilter::parse(word_type, step.comparison, step.filter_type, &step.value)
            .with_context(|| format!("step {} has an invalid filter", index + 1))?;

        session = SearchSession::filtered(&session, &live, filter);
        info!(
            "Step {}: {} {} matches left",
            index + 1,
            session.summary(),
            session.matching_address_count()
        );
    }

    let total_matches = session.matching_address_count();
    if total_matches > search.max_results {
        warn!(
            "Reporting the first {} of {} matches",
            search.max_results, total_matches
        );
    }

    let matches = session
        .iter_matches()
        .take(search.max_results)
        .map(|m| ReportEntry::new(&session, m))
        .collect();

    Ok(Report {
        word_type,
        summary: session.summary(),
        total_matches,
        matches,
    })
}

/// Loads one snapshot file into a memory space starting at `base`
fn load_snapshot(path: &Path, base: Address, memory_size: Option<u64>) -> Result<MemoryImage> {
    let image = match memory_size {
        Some(size) => MemoryImage::load_at(path, base, size),
        None if base.as_u64() == 0 => MemoryImage::load(path),
        None => {
            let len = std::fs::metadata(path)
                .with_context(|| format!("failed to stat snapshot {}", path.display()))?
                .len();
            MemoryImage::load_at(path, base, base.as_u64().saturating_add(len))
        }
    };
    image.with_context(|| format!("failed to load snapshot {}", path.display()))
}
