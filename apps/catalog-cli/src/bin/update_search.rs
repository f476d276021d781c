//! Update the game-data search indices from the record cache.
//!
//! Usage:
//!   update-search [--environment prod|staging|dev|local] [--full] [--content NAME] [--id N]
//!                 [--backend elastic|text] [--single-document] [--continue-on-error]
//!                 [--config PATH] [--json]

use std::cell::RefCell;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use catalog_cache::{CacheCatalogSource, CacheKeys, FileCache};
use catalog_core::config::{expand_path, is_production_like, Config, Settings};
use catalog_core::traits::SearchIndex;
use catalog_core::types::{ContentType, FailurePolicy};
use catalog_elastic::ElasticSearch;
use catalog_sync::{ContentOutcome, ContentReport, IndexSynchronizer, SyncMode, SyncObserver, SyncOptions, SyncReport};
use catalog_text::TantivySearchIndex;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    /// Elasticsearch over HTTP
    Elastic,
    /// Local Tantivy indices
    Text,
}

/// Sync cached game data into the search catalog
#[derive(Parser, Debug)]
#[command(name = "update-search")]
struct Args {
    /// Target environment; prod and staging use the production endpoint
    #[arg(long, short = 'e', default_value = "prod")]
    environment: String,

    /// Delete and recreate every index, then submit all records
    #[arg(long)]
    full: bool,

    /// Only this content type (e.g. Item)
    #[arg(long, short = 'c')]
    content: Option<String>,

    /// Only this record id
    #[arg(long)]
    id: Option<u64>,

    #[arg(long, value_enum, default_value = "elastic")]
    backend: Backend,

    /// Submit documents one by one instead of in bulk
    #[arg(long)]
    single_document: bool,

    /// Keep going when a content type fails
    #[arg(long)]
    continue_on_error: bool,

    /// Extra config file merged over config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

/// Human-readable output. With `--json` it goes to stderr so stdout holds
/// only the report.
#[derive(Debug, Clone, Copy)]
struct Console {
    to_stderr: bool,
}

impl Console {
    fn for_args(args: &Args) -> Self {
        Self { to_stderr: args.json }
    }

    fn line(&self, text: &str) {
        if self.to_stderr {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
    }
}

/// One progress bar per content type.
struct ProgressObserver {
    bar: RefCell<Option<ProgressBar>>,
    console: Console,
}

impl ProgressObserver {
    fn new(console: Console) -> Self {
        Self { bar: RefCell::new(None), console }
    }
}

impl SyncObserver for ProgressObserver {
    fn content_started(&self, ct: &ContentType, total: usize) {
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg} ({percent}%)")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb.set_message(ct.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        *self.bar.borrow_mut() = Some(pb);
    }

    fn advanced(&self, _ct: &ContentType) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            pb.inc(1);
        }
    }

    fn content_finished(&self, report: &ContentReport) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
        self.console.line(&summary_line(report));
    }
}

fn summary_line(report: &ContentReport) -> String {
    match &report.outcome {
        ContentOutcome::Skipped => format!("⏭️  {}: no ids in cache", report.content_type),
        ContentOutcome::Persisted => format!(
            "✅ {}: {} submitted, {} already indexed, {} without name, {} missing, {} failed, {} bulk calls",
            report.content_type,
            report.submitted.len(),
            report.already_indexed,
            report.rejected,
            report.missing,
            report.failed.len(),
            report.bulk_calls
        ),
        ContentOutcome::Aborted { error } => format!("❌ {}: aborted: {}", report.content_type, error),
    }
}

fn sync_options(args: &Args, settings: &Settings) -> SyncOptions {
    let mut options = SyncOptions::from_settings(&settings.sync);
    options.mode = if args.full { SyncMode::Full } else { SyncMode::Incremental };
    options.content_filter = args.content.clone();
    options.id_filter = args.id;
    options.single_document = args.single_document;
    if args.continue_on_error {
        options.failure_policy = FailurePolicy::Continue;
    }
    options
}

fn run<I: SearchIndex>(index: I, args: &Args, settings: &Settings) -> anyhow::Result<SyncReport> {
    let cache = FileCache::open(expand_path(&settings.cache.dir))?;
    let source = CacheCatalogSource::new(
        cache,
        CacheKeys::new(settings.cache.record_prefix.clone()),
        Duration::from_secs(settings.cache.ttl_secs),
    );
    let synchronizer = IndexSynchronizer::new(source, index, settings.mapping()?, sync_options(args, settings));
    Ok(synchronizer.run(&ProgressObserver::new(Console::for_args(args)))?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load_with(args.config.as_deref()).map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings()?;

    let console = Console::for_args(&args);
    console.line("Game Data Search Update\n=======================");
    if args.environment == "prod" {
        console.line("🚀 DEPLOYING TO PRODUCTION");
    }
    if args.full {
        console.line("⚠️  Full rebuild: indices will be deleted and recreated");
    }

    let started = Instant::now();
    let report = match args.backend {
        Backend::Elastic => {
            let url = settings.elastic.endpoint_for(&args.environment)?;
            tracing::info!(url, production = is_production_like(&args.environment), "using elasticsearch");
            run(ElasticSearch::new(url, &settings.elastic)?, &args, &settings)?
        }
        Backend::Text => {
            let dir = expand_path(&settings.text.index_dir);
            tracing::info!(dir = %dir.display(), "using local tantivy indices");
            run(TantivySearchIndex::new(dir)?, &args, &settings)?
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    console.line(&format!("\n📊 {} documents submitted in {:.1?}", report.submitted(), started.elapsed()));

    let aborted: Vec<String> = report.aborted().map(|c| c.content_type.to_string()).collect();
    if !aborted.is_empty() {
        anyhow::bail!("{} content type(s) aborted: {}", aborted.len(), aborted.join(", "));
    }
    if report.failed_items() > 0 {
        anyhow::bail!("{} document(s) were rejected by the index", report.failed_items());
    }
    Ok(())
}
