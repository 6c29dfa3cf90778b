use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use equiverse_collector::apis::create_adapter;
use equiverse_collector::classify::{Classifiers, RuleBook};
use equiverse_collector::config::Config;
use equiverse_collector::demo;
use equiverse_collector::infra::{save_report, AggregateReport};
use equiverse_collector::logging;
use equiverse_collector::pipeline::{Pipeline, PipelineResult};
use equiverse_collector::pipeline::storage::AggregationStore;
use equiverse_collector::types::SourceAdapter;

#[derive(Parser)]
#[command(name = "equiverse")]
#[command(about = "Anonymous workforce gender-by-seniority collector")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every configured source and save the aggregate report
    Collect {
        /// Config file (defaults to $EQUIVERSE_CONFIG or collector.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Classify one job title and optional grade code
    Classify {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        grade: String,
        /// JSON rule book to use instead of the built-in tables
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Estimate gender from a full name
    Estimate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Aggregate the built-in sample HR export and print the summary
    Demo,
}

fn load_classifiers(rules: Option<&PathBuf>) -> anyhow::Result<Classifiers> {
    match rules {
        Some(path) => Ok(RuleBook::load(path)
            .with_context(|| format!("loading rules from {}", path.display()))?
            .into_classifiers()),
        None => Ok(Classifiers::default()),
    }
}

fn print_run_stats(result: &PipelineResult) {
    println!("\n📊 Collection Results:");
    println!("   Rows seen: {}", result.rows_seen);
    println!("   Aggregated: {}", result.records_accepted);
    println!("   Unclassified: {}", result.records_dropped);
    if !result.failed_sources.is_empty() {
        println!("\n⚠️  Sources that failed:");
        for source in &result.failed_sources {
            println!("   - {}", source);
        }
    }
}

async fn run_collect(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => Config::load_from(&path),
        None => Config::load(),
    }
    .context("loading collector config")?;

    let classifiers = load_classifiers(config.collection.rules_path.as_ref())?;

    let mut sources: Vec<Box<dyn SourceAdapter>> = Vec::new();
    for source in &config.sources {
        match create_adapter(source) {
            Ok(adapter) => sources.push(adapter),
            Err(e) => warn!("Skipping source {}: {}", source.source_id(), e),
        }
    }
    if sources.is_empty() {
        anyhow::bail!("no usable sources configured");
    }

    let store = Arc::new(AggregationStore::new());
    let result = Pipeline::new(classifiers).run(sources, store).await;
    print_run_stats(&result);

    let report = AggregateReport::from_snapshot(&config.collection.label, &result.snapshot);
    println!("\n{}", report.render_summary());

    let saved = save_report(&report, &config.collection.output_dir).context("saving report")?;
    println!("💾 Saved {}", saved.json_path.display());
    println!("💾 Saved {}", saved.csv_path.display());
    Ok(())
}

async fn run_demo() -> anyhow::Result<()> {
    let source = demo::sample_source()?;
    let store = Arc::new(AggregationStore::new());
    let result = Pipeline::new(Classifiers::default())
        .run(vec![Box::new(source)], store)
        .await;
    print_run_stats(&result);

    let report = AggregateReport::from_snapshot("Sample HR export", &result.snapshot);
    println!("\n{}", report.render_summary());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Collect { config } => {
            println!("🔄 Running collection...");
            if let Err(e) = run_collect(config).await {
                error!("Collection failed: {:#}", e);
                println!("❌ Collection failed: {:#}", e);
                std::process::exit(1);
            }
            println!("✅ Collection completed successfully");
        }
        Commands::Classify { title, grade, rules } => {
            let classifiers = load_classifiers(rules.as_ref())?;
            match classifiers.tier.explain(&title, &grade) {
                Some(found) => {
                    info!(tier = found.tier.number(), "Classified title");
                    println!("{} ({:?})", found.tier, found.reason);
                }
                None => println!("Tier 0 (unclassified)"),
            }
        }
        Commands::Estimate { name, rules } => {
            let classifiers = load_classifiers(rules.as_ref())?;
            let gender = classifiers.gender.estimate_from_full_name(&name);
            println!("{}", gender);
        }
        Commands::Demo => {
            println!("🚀 Running demo over the built-in sample export...");
            run_demo().await?;
        }
    }
    Ok(())
}
