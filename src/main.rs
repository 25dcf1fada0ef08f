//! Sitegraph main entry point
//!
//! This is the command-line interface for the Sitegraph crawler.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sitegraph::config::load_raw_config;
use sitegraph::crawler::print_report;
use sitegraph::{
    ColonSegmentPolicy, Config, CrawlEngine, FailurePolicy, LinkResolver, SameHostPolicy,
};
use std::path::PathBuf;
use toml::{Table, Value};
use tracing_subscriber::EnvFilter;

/// Sitegraph: a paced site-graph crawler
///
/// Sitegraph starts from a seed URL, follows the links it finds within the
/// configured limits, and prints the parent/child structure of the pages it
/// fetched.
#[derive(Parser, Debug)]
#[command(name = "sitegraph")]
#[command(version = "1.0.0")]
#[command(about = "A paced site-graph crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when absent)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL (overrides TargetURL)
    #[arg(long, value_name = "URL")]
    target: Option<String>,

    /// Maximum number of vertices visited (overrides CrawlDepth)
    #[arg(long, value_name = "N")]
    depth: Option<u32>,

    /// Maximum number of pages processed (overrides PageNumberLimit)
    #[arg(long, value_name = "N")]
    pages: Option<u32>,

    /// Pause before each follow-up request in milliseconds (overrides RequestDelay)
    #[arg(long, value_name = "MS")]
    delay: Option<f64>,

    /// Number of concurrent fetch workers (overrides Workers)
    #[arg(long, value_name = "N")]
    workers: Option<u32>,

    /// User agent sent with every request (overrides UserAgent)
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Which discovered links are excluded before resolution
    #[arg(long, value_enum, default_value_t = LinkPolicy::ColonSegment)]
    link_policy: LinkPolicy,

    /// Try a URL again when a later page links to it after a failed fetch
    #[arg(long)]
    retry_failed: bool,

    /// Print the site graph as nested JSON instead of an indented tree
    #[arg(long)]
    json: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LinkPolicy {
    /// Skip hrefs with a colon in any `/`-separated segment
    ColonSegment,
    /// Skip links that leave the host of the page they were found on
    SameHost,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitegraph=info,warn"),
            1 => EnvFilter::new("sitegraph=debug,info"),
            2 => EnvFilter::new("sitegraph=trace,debug"),
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

/// Assembles the raw table from the config file (or defaults) plus flags
fn build_config(cli: &Cli) -> Result<Config> {
    let mut raw: Table = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_raw_config(path)
                .with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => match Value::try_from(Config::default())
            .context("Failed to serialize default configuration")?
        {
            Value::Table(table) => table,
            _ => Table::new(),
        },
    };

    let overrides = [
        ("TargetURL", cli.target.clone().map(Value::String)),
        ("CrawlDepth", cli.depth.map(|n| Value::Integer(n.into()))),
        ("PageNumberLimit", cli.pages.map(|n| Value::Integer(n.into()))),
        ("RequestDelay", cli.delay.map(Value::Float)),
        ("Workers", cli.workers.map(|n| Value::Integer(n.into()))),
        ("UserAgent", cli.user_agent.clone().map(Value::String)),
    ];
    for (key, value) in overrides {
        if let Some(value) = value {
            raw.insert(key.to_string(), value);
        }
    }

    Config::from_raw(Some(&raw)).context("Invalid configuration")
}

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sitegraph Dry Run ===\n");

    println!("Crawl Configuration:");
    println!("  Target URL: {}", config.target_url);
    println!("  Crawl depth (vertices): {}", config.crawl_depth);
    println!("  Page number limit: {}", config.page_number_limit);
    println!("  Request delay: {}ms", config.request_delay_ms);
    println!("  Request timeout: {}ms", config.request_timeout_ms);
    println!("  Workers: {}", config.workers);
    println!("  User agent: {:?}", config.user_agent);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, cli: &Cli) -> Result<()> {
    let resolver = match cli.link_policy {
        LinkPolicy::ColonSegment => LinkResolver::with_policy(ColonSegmentPolicy),
        LinkPolicy::SameHost => LinkResolver::with_policy(SameHostPolicy),
    };
    let failure_policy = if cli.retry_failed {
        FailurePolicy::AllowRetry
    } else {
        FailurePolicy::MarkVisited
    };

    let mut engine = CrawlEngine::http(config)?
        .with_resolver(resolver)
        .with_failure_policy(failure_policy);

    let token = engine.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, stopping after the current page");
            token.cancel();
        }
    });

    let report = engine.start().await?;

    let Some(root) = engine.graph().root() else {
        tracing::warn!("No pages were fetched");
        print_report(&report);
        return Ok(());
    };

    if cli.json {
        let tree = engine.graph().tree_map(root)?;
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print!("{}", engine.graph().render_tree(root, "")?);
        println!();
        print_report(&report);
    }

    Ok(())
}
