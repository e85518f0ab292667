//! Webrill main entry point
//!
//! Command-line interface for the webrill site crawler.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webrill::config::load_config_with_hash;
use webrill::start_crawl;

/// Webrill: a polite recursive site crawler
///
/// Webrill crawls one site from a root URL, respecting robots.txt and a
/// per-site rate limit, following links selected by ordered pattern rules,
/// and streaming every fetched page as it arrives.
#[derive(Parser, Debug)]
#[command(name = "webrill")]
#[command(version)]
#[command(about = "A polite recursive site crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Crawl this root URL instead of the one in the config
    #[arg(long, value_name = "URL")]
    root: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(root) = cli.root {
        config.site.root = root;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(&config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webrill=info,warn"),
            1 => EnvFilter::new("webrill=debug,info"),
            2 => EnvFilter::new("webrill=trace,debug"),
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

/// Handles --dry-run: validates config and shows what would be crawled
fn handle_dry_run(config: &webrill::Config) {
    println!("=== Webrill Dry Run ===\n");

    println!("Site:");
    println!("  Root: {}", config.site.root);

    println!("\nCrawler Configuration:");
    println!(
        "  Rate limit interval: {}ms",
        config.crawler.rate_limit_interval_ms
    );
    println!("  Dispatch delay: {}ms", config.crawler.dispatch_delay_ms);
    println!("  Fetch timeout: {}ms", config.crawler.fetch_timeout_ms);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nHref Rules ({}):", config.rules.href.len());
    for rule in &config.rules.href {
        println!("  - {:?} -> {}", rule.pattern, rule.label);
    }

    println!("\nAnchor Rules ({}):", config.rules.anchor.len());
    for rule in &config.rules.anchor {
        println!("  - {:?} -> {}", rule.pattern, rule.label);
    }

    if config.rules.href.is_empty() && config.rules.anchor.is_empty() {
        println!("\nNo rules configured: every same-site link will be followed as a page");
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &webrill::Config) -> anyhow::Result<()> {
    tracing::info!("Starting crawl of {}", config.site.root);

    let start_time = std::time::Instant::now();
    let mut handle = start_crawl(config)?;
    let mut pages_received = 0usize;

    while let Some(page) = handle.next_page().await {
        pages_received += 1;
        tracing::info!(
            "[{}] {} ({} bytes)",
            page.label,
            page.url,
            page.html.len()
        );
    }

    let summary = handle.join().await;

    tracing::info!(
        "Crawl completed: {} pages received, {} URLs visited in {:?}",
        pages_received,
        summary.visited_count(),
        start_time.elapsed()
    );

    Ok(())
}
