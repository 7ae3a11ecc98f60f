//! Command-line interface definitions for the NBER scraper.
//!
//! Three subcommands: `scrape` crawls and saves papers, `test` checks that the
//! site is reachable and runs a one-page crawl, `analyze` summarizes a saved
//! file. Global options select the settings file and site root.

use clap::{Args, Parser, Subcommand};

use crate::config::ScraperConfig;
use crate::crawler::CrawlSettings;
use crate::error::Result;
use crate::filters::{DateRange, MatchMode};

/// Command-line arguments for the NBER scraper.
///
/// # Examples
///
/// ```sh
/// # AI papers from the first two listing pages
/// nber_scraper scrape -q AI -p 2
///
/// # Phrase search within a date range, downloading PDFs
/// nber_scraper scrape -q "monetary policy" --start-date 2023/01/01 --end-date 2023-12-31 --download-pdfs
///
/// # Summarize a saved file
/// nber_scraper analyze data/nber_ai_papers.json --output-dir analysis
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, global = true, env = "NBER_SCRAPER_CONFIG")]
    pub config: Option<String>,

    /// Root URL of the NBER site (overrides the settings file)
    #[arg(long, global = true, env = "NBER_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Crawl NBER papers matching a query and save them as JSON
    Scrape(ScrapeArgs),
    /// Check connectivity and run a one-page crawl
    Test(TestArgs),
    /// Summarize a previously saved JSON file
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Search query; empty keeps every paper
    #[arg(short, long, default_value = "AI")]
    pub query: String,

    /// Maximum listing pages to visit (default: until the listing ends)
    #[arg(short, long)]
    pub pages: Option<usize>,

    /// Stop after this many matching papers
    #[arg(short = 'm', long)]
    pub max_results: Option<usize>,

    /// Output JSON filename (default: nber_<query>_papers.json)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output directory
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Earliest publication date, YYYY/MM/DD or YYYY-MM-DD
    #[arg(long)]
    pub start_date: Option<String>,

    /// Latest publication date, YYYY/MM/DD or YYYY-MM-DD
    #[arg(long)]
    pub end_date: Option<String>,

    /// Download the PDF of every matching paper
    #[arg(long)]
    pub download_pdfs: bool,

    /// How multi-word queries are matched
    #[arg(long, value_enum, default_value_t = MatchMode::Phrase)]
    pub match_mode: MatchMode,

    /// Delay between requests in milliseconds
    #[arg(short, long)]
    pub delay_ms: Option<u64>,

    /// Papers per listing page
    #[arg(long)]
    pub per_page: Option<usize>,

    /// Safety cap on papers examined
    #[arg(long)]
    pub max_checked: Option<usize>,
}

impl ScrapeArgs {
    /// Build the immutable crawl settings, validating date bounds.
    pub fn settings(&self) -> Result<CrawlSettings> {
        Ok(CrawlSettings {
            query: self.query.clone(),
            match_mode: self.match_mode,
            max_pages: self.pages,
            max_results: self.max_results,
            date_range: DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())?,
            download_pdfs: self.download_pdfs,
            progress_path: None,
        })
    }

    /// Apply flag overrides on top of file/default settings.
    pub fn apply(&self, config: &mut ScraperConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(delay) = self.delay_ms {
            config.request_delay_ms = delay;
        }
        if let Some(per_page) = self.per_page {
            config.per_page = per_page;
        }
        if let Some(cap) = self.max_checked {
            config.max_papers_checked = cap;
        }
    }
}

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Query used for the trial crawl
    #[arg(short, long, default_value = "test")]
    pub query: String,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// JSON file written by `scrape`
    pub input: String,

    /// Directory for the Markdown report and JSON summary
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Number of top authors and keywords to show
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,
}
