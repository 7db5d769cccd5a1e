//! Siteseeker main entry point
//!
//! This is the command-line interface for the Siteseeker target-site hunter.

use anyhow::Context;
use clap::Parser;
use siteseeker::config::{load_config_with_hash, Config};
use siteseeker::fetch::HttpPageFetcher;
use siteseeker::storage::{open_storage, TargetStore};
use siteseeker::{CrawlOutcome, KeywordClassifier, Scheduler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Siteseeker: hunts illicit-service sites through community boards
///
/// Siteseeker searches community sites for configured keywords, explores the
/// posts it finds, records linked gambling, private-server, ad-host and
/// chat-invite sites, and grows its own keyword and domain frontier as it goes.
#[derive(Parser, Debug)]
#[command(name = "siteseeker")]
#[command(version)]
#[command(about = "A frontier-expanding hunter for illicit-service websites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show target-site statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Write the markdown summary of stored target sites and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).with_context(|| format!("loading {}", cli.config.display()));
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else {
        handle_crawl(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("siteseeker=info,warn"),
            1 => EnvFilter::new("siteseeker=debug,info"),
            2 => EnvFilter::new("siteseeker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Siteseeker Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max crawl cycles: {}", config.crawler.max_crawl_cycles);
    println!("  Max concurrency: {}", config.crawler.max_concurrency);
    println!("  Search delay: {}ms", config.crawler.search_delay_ms);
    println!("  Batch delay: {}ms", config.crawler.batch_delay_ms);
    println!("  Max domain retries: {}", config.crawler.max_domain_retries);
    println!(
        "  Domain discovery limit: {}",
        config.crawler.domain_discovery_limit
    );

    println!("\nFetch:");
    println!("  Search URL: {}", config.fetch.search_url);
    println!("  Timeout: {}ms", config.fetch.timeout_ms);
    println!(
        "  Retries: {} ({}ms apart)",
        config.fetch.retry_limit, config.fetch.retry_delay_ms
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\nSeed Domains ({}):", config.crawler.seed_domains.len());
    for domain in &config.crawler.seed_domains {
        println!("  - {}", domain);
    }

    println!("\nSeed Keywords ({}):", config.crawler.seed_keywords.len());
    for keyword in &config.crawler.seed_keywords {
        println!("  - {}", keyword);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start with {} domain×keyword searches",
        config.crawler.seed_domains.len() * config.crawler.seed_keywords.len()
    );
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use siteseeker::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .context("opening target-site database")?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    use siteseeker::output::{generate_markdown_summary, generate_summary};

    println!("=== Exporting Target Summary ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let storage = open_storage(Path::new(&config.output.database_path))
        .context("opening target-site database")?;

    tracing::info!("Loading target sites from database...");
    let summary = generate_summary(&storage)?;

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))
        .with_context(|| format!("writing {}", config.output.summary_path))?;

    println!("✓ Summary exported to: {}", config.output.summary_path);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String) -> anyhow::Result<()> {
    let store: Arc<dyn TargetStore> = Arc::new(
        open_storage(Path::new(&config.output.database_path))
            .context("opening target-site database")?,
    );
    let fetcher = Arc::new(
        HttpPageFetcher::new(&config.fetch, config.crawler.batch_size())
            .context("building HTTP client")?,
    );
    let classifier = Arc::new(KeywordClassifier::new(&config.classifier));

    tracing::info!(
        "Seed domains: {}, seed keywords: {}",
        config.crawler.seed_domains.len(),
        config.crawler.seed_keywords.len()
    );

    let scheduler = Arc::new(
        Scheduler::new(config.crawler.clone(), fetcher, classifier, store)
            .with_config_hash(config_hash),
    );

    {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received");
                scheduler.stop();
            }
        });
    }

    let report = scheduler
        .start()
        .await
        .context("a crawl is already running")?;

    match &report.outcome {
        CrawlOutcome::Failed(reason) => {
            tracing::error!("Crawl failed: {}", reason);
            anyhow::bail!("crawl failed: {}", reason);
        }
        outcome => {
            tracing::info!(
                "Crawl {}: {} target sites confirmed, {} domains searched, {} keywords known",
                outcome,
                report.stats.sites_confirmed,
                report.frontier.history.len(),
                report.frontier.vocabulary.len()
            );
        }
    }

    Ok(())
}
