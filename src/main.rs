//! # NBER Scraper
//!
//! Crawls the NBER working-paper listing, keeps the papers whose title,
//! abstract or authors match a query (and whose publication date falls in an
//! optional range), and saves them as JSON. A second command summarizes a
//! saved file.
//!
//! ## Usage
//!
//! ```sh
//! nber_scraper scrape -q AI -p 2
//! nber_scraper test
//! nber_scraper analyze data/nber_ai_papers.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Listing**: fetch listing pages one by one and collect paper links
//! 2. **Detail**: fetch and parse each unseen paper's page
//! 3. **Filter**: keep papers accepted by the keyword matcher and date range
//! 4. **Output**: write the kept papers to JSON, optionally download PDFs
//!
//! Kept papers are snapshotted while crawling; Ctrl-C saves what was found so
//! far before exiting with an error.

use std::error::Error;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod cli;
mod config;
mod crawler;
mod error;
mod fetch;
mod filters;
mod models;
mod outputs;
mod scrapers;
mod utils;

use analysis::Analysis;
use cli::{AnalyzeArgs, Cli, Command, ScrapeArgs, TestArgs};
use config::ScraperConfig;
use crawler::{CrawlSettings, Crawler, StopReason, check_connectivity};
use error::ScrapeError;
use fetch::HttpFetcher;
use models::Paper;
use outputs::json::{self, Checkpoint};
use outputs::report;
use utils::{ensure_writable_dir, truncate_for_log};

/// Delay cap for the `test` command's trial crawl.
const TEST_MAX_DELAY: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = ScraperConfig::load(args.config.as_deref()).await?;
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }

    let result = match args.command {
        Command::Scrape(scrape) => run_scrape(config, scrape).await,
        Command::Test(test) => run_test(config, test).await,
        Command::Analyze(analyze) => run_analyze(analyze).await,
    };

    let elapsed = start_time.elapsed();
    match &result {
        Ok(()) => info!(?elapsed, secs = elapsed.as_secs(), "Execution complete"),
        Err(e) => error!(?elapsed, error = %e, "Execution failed"),
    }
    result
}

#[instrument(level = "info", skip_all, fields(query = %args.query))]
async fn run_scrape(mut config: ScraperConfig, args: ScrapeArgs) -> Result<(), Box<dyn Error>> {
    // Date bounds are validated before any network activity.
    let mut settings = args.settings()?;
    args.apply(&mut config);
    config.validate()?;
    let progress_path = json::checkpoint_path(&config.output_dir, &settings.query, Checkpoint::Progress);
    settings.progress_path = Some(progress_path.clone());

    let output_path = json::output_path(&config.output_dir, args.output.as_deref(), &args.query);
    let output_dir = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(path = %output_dir.display(), error = %e, "Output directory is not writable");
        return Err(e.into());
    }

    let fetcher = HttpFetcher::new(&config)?;
    if let Err(e) = check_connectivity(&fetcher, &config, &settings.query).await {
        error!(base_url = %config.base_url, error = %e, "Cannot reach the site");
        return Err(e.into());
    }

    let outcome = Crawler::new(&fetcher, &config, &settings)?
        .paced_from_start()
        .run_until(interrupted())
        .await;

    if outcome.stop_reason == Some(StopReason::Interrupted) {
        println!("\nScraping interrupted by user.");
        save_partial(&outcome.papers, &config.output_dir, &settings.query, Checkpoint::Interrupted).await;
        json::discard_checkpoint(&progress_path).await;
        return Err(ScrapeError::Interrupted {
            papers: outcome.papers.len(),
        }
        .into());
    }

    if let Err(e) = json::write_papers(&outcome.papers, &output_path).await {
        error!(path = %output_path.display(), error = %e, "Failed to write results");
        save_partial(&outcome.papers, &config.output_dir, &settings.query, Checkpoint::Error).await;
        return Err(e.into());
    }
    json::discard_checkpoint(&progress_path).await;

    let summary = Analysis::from_papers(&outcome.papers, 0);
    println!("Results:");
    println!("  Pages visited: {}", outcome.pages_visited);
    println!("  Papers checked: {}", outcome.papers_checked);
    println!("  Papers found: {}", summary.total_papers);
    println!("  Papers with abstracts: {}", summary.with_abstracts);
    println!("  Papers with PDFs: {}", summary.with_pdf_urls);
    if settings.download_pdfs {
        println!(
            "  PDFs downloaded: {} ({} failed)",
            outcome.pdfs_downloaded, outcome.pdf_failures
        );
    }
    if let Some(reason) = outcome.stop_reason {
        println!("  Stopped: {reason}");
    }
    println!("  Saved to: {}", output_path.display());
    if let Some(first) = outcome.papers.first() {
        println!("\nFirst paper: {}", first.title);
        println!("Has abstract: {}", if first.has_abstract() { "Yes" } else { "No" });
    }
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed it never resolves.
async fn interrupted() {
    match signal::ctrl_c().await {
        Ok(()) => warn!("Interrupt received; stopping crawl"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl-C; partial results will not be saved");
            std::future::pending::<()>().await;
        }
    }
}

/// Save papers from a run that did not finish normally.
async fn save_partial(papers: &[Paper], output_dir: &str, query: &str, kind: Checkpoint) {
    if papers.is_empty() {
        println!("No papers collected; nothing to save.");
        return;
    }
    let path = json::checkpoint_path(output_dir, query, kind);
    match json::write_papers(papers, &path).await {
        Ok(()) => println!("Partial data saved to: {}", path.display()),
        Err(e) => error!(path = %path.display(), error = %e, "Could not save partial data"),
    }
}

#[instrument(level = "info", skip_all, fields(query = %args.query))]
async fn run_test(mut config: ScraperConfig, args: TestArgs) -> Result<(), Box<dyn Error>> {
    config.request_delay_ms = config.request_delay_ms.min(TEST_MAX_DELAY.as_millis() as u64);
    config.validate()?;
    let fetcher = HttpFetcher::new(&config)?;

    println!("Testing page retrieval...");
    let links = check_connectivity(&fetcher, &config, &args.query).await?;
    println!("  Base URL accessible: true ({links} paper links on page 1)");

    println!("Testing search functionality...");
    let settings = CrawlSettings {
        query: args.query.clone(),
        max_pages: Some(1),
        ..CrawlSettings::default()
    };
    let outcome = Crawler::new(&fetcher, &config, &settings)?
        .paced_from_start()
        .run()
        .await;
    println!("  Found {} papers", outcome.papers.len());

    if let Some(sample) = outcome.papers.first() {
        println!("  Sample paper:");
        println!("    Title: {}", truncate_for_log(&sample.title, 100));
        let authors: Vec<&str> = sample.authors.iter().take(3).map(String::as_str).collect();
        println!("    Authors: {}", authors.join(", "));
        println!(
            "    Has abstract: {}",
            if sample.has_abstract() { "Yes" } else { "No" }
        );
    }
    println!("\nTest completed successfully!");
    Ok(())
}

#[instrument(level = "info", skip_all, fields(input = %args.input))]
async fn run_analyze(args: AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    let input = Path::new(&args.input);
    let papers = json::read_papers(input).await.inspect_err(|e| {
        error!(path = %input.display(), error = %e, "Cannot load papers file");
    })?;

    let analysis = Analysis::from_papers(&papers, args.top_n);
    println!("Analyzing papers from: {}", args.input);
    println!("{}", "-".repeat(50));
    print!("{}", report::render_text(&analysis, args.top_n));

    if let Some(dir) = &args.output_dir {
        let path = report::write_report(&analysis, &papers, &args.input, Path::new(dir)).await?;
        println!("\nSaved report: {}", path.display());
    }
    Ok(())
}
