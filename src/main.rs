use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};

use erpsync::config::{load_config, locate_config, ImportConfig};
use erpsync::sinks::{HttpSinks, LiveDispatcher, RedisStore};
use erpsync::{FailureLedger, ImportPipeline, PipelineConfig, ResumeSet, SourceDocument, SystemCodeTable};

#[derive(Parser)]
#[command(name = "upload-xml")]
#[command(about = "Import ERP clients, their systems and employees into the ticketing system")]
#[command(version)]
struct Args {
    /// Only re-process the clients listed in the previous run's error_clients file
    #[arg(short = 'f', long = "fix")]
    fix: bool,
}

fn main() {
    let args = Args::parse();
    erpsync::logging::init("warn");

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config_path = locate_config()?;
    let config: ImportConfig = load_config(&config_path)?;
    tracing::info!("Using config {}", config_path.display());

    // Read before the ledgers below truncate the same file
    let pipeline_config = if args.fix {
        PipelineConfig::resume(ResumeSet::load(&config.error_clients)?)
    } else {
        PipelineConfig::default()
    };

    let codes = SystemCodeTable::load(&config.system_code)?;
    let mut ledger = FailureLedger::create(&config.errors, &config.error_clients)?;
    let document = SourceDocument::load(&config.source)?;

    let store = RedisStore::new(&config.redis_url, config.request_timeout())
        .context("Invalid redis_url")?;
    let http = HttpSinks::new(&config.url_client, &config.url_user, config.request_timeout())
        .context("Failed to set up HTTP sinks")?;

    let mut pipeline = ImportPipeline::new(
        pipeline_config,
        &codes,
        LiveDispatcher::new(store, http),
    );

    // Line-buffered, so progress shows up as it happens
    let mut console = io::stdout().lock();
    let stats = pipeline.run(&document, &mut ledger, &mut console)?;
    console.flush()?;

    tracing::info!(
        "companies: {} created, {} failed; users: {} created, {} failed",
        stats.companies_created,
        stats.company_failures,
        stats.users_created,
        stats.user_failures
    );
    Ok(())
}
