//! Command-line entry point for the marketplace scraper

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use marketplace_scraper::config::ScraperConfig;
use marketplace_scraper::extractors::{listing_cards, product_detail};
use marketplace_scraper::fetcher::{PageFetcher, RenderedFetcher, StaticFetcher};
use marketplace_scraper::render::ChromeLauncher;
use marketplace_scraper::retry::RetryTransport;
use marketplace_scraper::runner::{run_discovery, run_listing_pages, RunSummary};
use marketplace_scraper::search::SerpApiClient;
use marketplace_scraper::store::{read_url_column, CsvSink, DEFAULT_URL_COLUMN};
use marketplace_scraper::transport::UreqTransport;

#[derive(Parser)]
#[command(
    name = "marketplace-scraper",
    about = "Scrape TradeIndia product listings into CSV tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find product pages through web search and extract their details
    Discover {
        #[arg(short, long, default_value = "tradeindia_products.csv")]
        output: PathBuf,
        /// Search keyword; repeat to replace the built-in industry list
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,
    },
    /// Extract product cards from the listing pages named in an input table
    Listings {
        /// CSV file holding the listing page URLs
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long, default_value = DEFAULT_URL_COLUMN)]
        column: String,
        #[arg(short, long, default_value = "tradeindia_listings.csv")]
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = FetchMode::Rendered)]
        fetch: FetchMode,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FetchMode {
    /// Headless Chrome with lazy-load scrolling
    Rendered,
    /// Plain HTTP GET with retries
    Static,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ScraperConfig::from_env()?;

    let summary = match cli.command {
        Command::Discover { output, keywords } => discover(config, output, keywords)?,
        Command::Listings {
            input,
            column,
            output,
            fetch,
        } => listings(config, input, &column, output, fetch)?,
    };

    tracing::info!(
        pages_ok = summary.pages_ok,
        pages_failed = summary.pages_failed,
        records = summary.records,
        "Scraping finished"
    );
    Ok(())
}

fn static_fetcher(config: &ScraperConfig) -> StaticFetcher<RetryTransport<UreqTransport>> {
    StaticFetcher::new(RetryTransport::new(
        UreqTransport::new(&config.http),
        config.retry.clone(),
    ))
}

fn rendered_fetcher(config: &ScraperConfig) -> RenderedFetcher<ChromeLauncher> {
    let mut launcher = ChromeLauncher::new(&config.scroll);
    launcher.executable = config.chrome_executable.clone();
    launcher.no_sandbox = config.chrome_no_sandbox;
    RenderedFetcher::new(launcher, config.scroll.clone())
}

fn discover(mut config: ScraperConfig, output: PathBuf, keywords: Vec<String>) -> Result<RunSummary> {
    if !keywords.is_empty() {
        config.discovery.keywords = keywords;
    }

    let api_key = config.require_api_key()?;
    let provider = SerpApiClient::new(api_key, config.http.timeout)
        .context("Failed to build search client")?;
    let schema = product_detail().context("Invalid product detail schema")?;
    let sink = CsvSink::new(&output, &schema.columns());
    let mut fetcher = static_fetcher(&config);

    tracing::info!(
        keywords = config.discovery.keywords.len(),
        output = %output.display(),
        "Starting discovery"
    );

    run_discovery(
        &provider,
        &mut fetcher,
        &schema,
        &config.discovery,
        config.page_delay,
        sink,
    )
    .with_context(|| format!("Failed to save results to {}", output.display()))
}

fn listings(
    config: ScraperConfig,
    input: PathBuf,
    column: &str,
    output: PathBuf,
    fetch: FetchMode,
) -> Result<RunSummary> {
    let urls = read_url_column(&input, column)
        .with_context(|| format!("Failed to read URLs from {}", input.display()))?;
    let schema = listing_cards().context("Invalid listing schema")?;
    let sink = CsvSink::new(&output, &schema.columns());

    tracing::info!(urls = urls.len(), output = %output.display(), "Starting listing scrape");

    let mut fetcher: Box<dyn PageFetcher> = match fetch {
        FetchMode::Rendered => Box::new(rendered_fetcher(&config)),
        FetchMode::Static => Box::new(static_fetcher(&config)),
    };

    run_listing_pages(&urls, fetcher.as_mut(), &schema, sink)
        .with_context(|| format!("Failed to save results to {}", output.display()))
}
