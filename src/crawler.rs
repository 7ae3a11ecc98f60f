//! Listing-page crawl loop.
//!
//! The crawler walks listing pages `1, 2, ...`, fetches every paper it has not
//! seen yet, and keeps the ones accepted by both the [`Matcher`] and the
//! [`DateRange`]. Work is strictly sequential: one request completes before
//! the next starts, with a polite delay in between.
//!
//! # State machine
//!
//! ```text
//! Idle ──► Paging(1) ──► Paging(2) ──► ... ──► Done(reason)
//! ```
//!
//! After every examined paper the crawl stops when the result cap is reached,
//! then when the examined-papers safety cap is reached. Before each page it
//! stops when the page limit is exceeded. An empty listing page, or too many
//! failed listing pages in a row, also ends the crawl.
//!
//! [`Crawler::run_until`] also races each page against a shutdown future;
//! when it fires the papers kept so far are returned with
//! [`StopReason::Interrupted`].
//!
//! # Failure handling
//!
//! A failed listing page counts as a page with no papers; a failed or
//! unparsable detail page skips that paper; a failed PDF download is logged
//! and the paper is still kept. None of these abort the run.

use std::collections::HashSet;
use std::fmt;
use std::future::{Future, pending};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use rand::{Rng, rng};
use tokio::fs;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::ScraperConfig;
use crate::error::Result;
use crate::fetch::Fetch;
use crate::filters::{DateRange, MatchMode, Matcher};
use crate::models::Paper;
use crate::outputs::json;
use crate::scrapers::nber::{PaperLink, listing_url, parse_listing, parse_paper};
use crate::utils::truncate_for_log;

const PROGRESS_EVERY: usize = 50;

/// What to look for in one run. Built once and never changed during the crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlSettings {
    pub query: String,
    pub match_mode: MatchMode,
    /// Highest listing page to visit.
    pub max_pages: Option<usize>,
    /// Stop once this many papers have been kept.
    pub max_results: Option<usize>,
    pub date_range: DateRange,
    pub download_pdfs: bool,
    /// Where to save periodic snapshots of kept papers.
    pub progress_path: Option<PathBuf>,
}

/// Why a crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxResults,
    CheckedCap,
    PageLimit,
    ListingExhausted,
    TooManyPageFailures,
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MaxResults => "reached maximum number of results",
            Self::CheckedCap => "reached papers-checked safety cap",
            Self::PageLimit => "reached page limit",
            Self::ListingExhausted => "no more papers listed",
            Self::TooManyPageFailures => "too many consecutive listing page failures",
            Self::Interrupted => "interrupted",
        };
        f.write_str(text)
    }
}

/// Result of a crawl: kept papers in discovery order plus counters.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub papers: Vec<Paper>,
    pub pages_visited: usize,
    pub papers_checked: usize,
    pub page_failures: usize,
    pub detail_failures: usize,
    pub pdfs_downloaded: usize,
    pub pdf_failures: usize,
    pub stop_reason: Option<StopReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Paging(usize),
    Done(StopReason),
}

/// Sequential crawler over any [`Fetch`] implementation.
pub struct Crawler<'a, F> {
    fetcher: &'a F,
    config: &'a ScraperConfig,
    settings: &'a CrawlSettings,
    matcher: Matcher,
    base: Url,
    requests_made: usize,
    consecutive_page_failures: usize,
    seen: HashSet<String>,
}

impl<'a, F: Fetch> Crawler<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a ScraperConfig, settings: &'a CrawlSettings) -> Result<Self> {
        let base = Url::parse(&config.base_url)?;
        Ok(Self {
            fetcher,
            config,
            settings,
            matcher: Matcher::new(&settings.query, settings.match_mode),
            base,
            requests_made: 0,
            consecutive_page_failures: 0,
            seen: HashSet::new(),
        })
    }

    /// Delay the very first request as well.
    ///
    /// Use this when the same site was contacted just before the crawl, as
    /// [`check_connectivity`] does.
    pub fn paced_from_start(mut self) -> Self {
        self.requests_made = 1;
        self
    }

    /// Run the crawl to completion.
    pub async fn run(self) -> CrawlOutcome {
        self.run_until(pending()).await
    }

    /// Run the crawl until it stops on its own or `shutdown` resolves.
    ///
    /// # Arguments
    ///
    /// * `shutdown` - Future that resolves when the crawl should end early,
    ///   typically a Ctrl-C listener
    ///
    /// # Returns
    ///
    /// The [`CrawlOutcome`] with every paper kept so far. After a shutdown its
    /// `stop_reason` is [`StopReason::Interrupted`]; a paper whose detail
    /// page was still being processed is not included.
    #[instrument(level = "info", skip_all, fields(query = %self.settings.query))]
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) -> CrawlOutcome {
        info!(
            query = %self.matcher.query(),
            mode = ?self.matcher.mode(),
            max_pages = ?self.settings.max_pages,
            max_results = ?self.settings.max_results,
            checked_cap = self.config.max_papers_checked,
            date_range_active = self.settings.date_range.is_active(),
            "Starting crawl"
        );

        tokio::pin!(shutdown);
        let mut outcome = CrawlOutcome::default();
        let mut state = State::Idle;
        loop {
            state = match state {
                State::Idle => State::Paging(1),
                State::Paging(page) if self.settings.max_pages.is_some_and(|max| page > max) => {
                    State::Done(StopReason::PageLimit)
                }
                State::Paging(page) => tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        warn!(page, "Crawl interrupted");
                        State::Done(StopReason::Interrupted)
                    }
                    stop = self.crawl_page(page, &mut outcome) => match stop {
                        Some(reason) => State::Done(reason),
                        None => State::Paging(page + 1),
                    },
                },
                State::Done(reason) => {
                    outcome.stop_reason = Some(reason);
                    break;
                }
            };
        }

        info!(
            pages = outcome.pages_visited,
            checked = outcome.papers_checked,
            found = outcome.papers.len(),
            page_failures = outcome.page_failures,
            detail_failures = outcome.detail_failures,
            reason = %outcome.stop_reason.map(|r| r.to_string()).unwrap_or_default(),
            "Crawl completed"
        );
        outcome
    }

    /// Process one listing page. Returns a stop reason if the crawl is over.
    async fn crawl_page(&mut self, page: usize, outcome: &mut CrawlOutcome) -> Option<StopReason> {
        let url = listing_url(
            &self.config.base_url,
            page,
            self.config.per_page,
            &self.settings.query,
        );
        outcome.pages_visited += 1;

        let html = match self.get_text(&url).await {
            Ok(html) => {
                self.consecutive_page_failures = 0;
                html
            }
            Err(e) => {
                warn!(page, %url, error = %e, "Listing page failed; treating as empty");
                outcome.page_failures += 1;
                self.consecutive_page_failures += 1;
                if self.consecutive_page_failures >= self.config.max_consecutive_page_failures {
                    return Some(StopReason::TooManyPageFailures);
                }
                return None;
            }
        };

        let links: Vec<PaperLink> = parse_listing(&html, &self.base)
            .into_iter()
            .filter(|link| self.seen.insert(link.paper_id.clone()))
            .collect();
        info!(page, new_links = links.len(), "Listing page parsed");
        if links.is_empty() {
            return Some(StopReason::ListingExhausted);
        }

        for link in links {
            outcome.papers_checked += 1;

            match self.examine(&link).await {
                Ok(Some(paper)) => {
                    info!(
                        found = outcome.papers.len() + 1,
                        paper_id = %paper.paper_id,
                        title = %truncate_for_log(&paper.title, 100),
                        "Found matching paper"
                    );
                    if self.settings.download_pdfs && paper.has_pdf() {
                        match self.download_pdf(&paper).await {
                            Ok(path) => {
                                info!(path = %path.display(), "Downloaded PDF");
                                outcome.pdfs_downloaded += 1;
                            }
                            Err(e) => {
                                warn!(paper_id = %paper.paper_id, error = %e, "PDF download failed; keeping paper");
                                outcome.pdf_failures += 1;
                            }
                        }
                    }
                    outcome.papers.push(paper);
                    self.save_progress(&outcome.papers).await;
                }
                Ok(None) => debug!(paper_id = %link.paper_id, "Paper filtered out"),
                Err(e) if e.is_skippable() => {
                    warn!(paper_id = %link.paper_id, error = %e, "Skipping paper");
                    outcome.detail_failures += 1;
                }
                Err(e) => {
                    error!(paper_id = %link.paper_id, error = %e, "Unexpected error; skipping paper");
                    outcome.detail_failures += 1;
                }
            }

            if outcome.papers_checked % PROGRESS_EVERY == 0 {
                info!(
                    checked = outcome.papers_checked,
                    found = outcome.papers.len(),
                    "Progress"
                );
            }
            if self
                .settings
                .max_results
                .is_some_and(|max| outcome.papers.len() >= max)
            {
                return Some(StopReason::MaxResults);
            }
            if outcome.papers_checked >= self.config.max_papers_checked {
                return Some(StopReason::CheckedCap);
            }
        }
        None
    }

    /// Fetch and parse a detail page; `None` when a filter rejects it.
    async fn examine(&mut self, link: &PaperLink) -> Result<Option<Paper>> {
        let html = self.get_text(&link.url).await?;
        let paper = parse_paper(&html, link, Utc::now())?;
        let keep = self.matcher.is_match(&paper) && self.settings.date_range.contains(paper.date);
        Ok(keep.then_some(paper))
    }

    async fn download_pdf(&mut self, paper: &Paper) -> Result<PathBuf> {
        let pdf_url = paper.pdf_url.as_deref().unwrap_or_default();
        self.pause().await;
        let bytes = self.fetcher.get_bytes(pdf_url).await?;

        let dir = Path::new(&self.config.download_dir);
        fs::create_dir_all(dir).await?;
        let path = dir.join(paper.pdf_file_name());
        fs::write(&path, bytes).await?;
        Ok(path)
    }

    async fn save_progress(&self, papers: &[Paper]) {
        let Some(path) = &self.settings.progress_path else {
            return;
        };
        let every = self.config.progress_every;
        if every == 0 || papers.len() % every != 0 {
            return;
        }
        if let Err(e) = json::write_papers(papers, path).await {
            warn!(path = %path.display(), error = %e, "Could not save progress snapshot");
        }
    }

    async fn get_text(&mut self, url: &str) -> Result<String> {
        self.pause().await;
        self.fetcher.get_text(url).await
    }

    /// Sleep between consecutive requests; the first request goes out at once.
    async fn pause(&mut self) {
        self.requests_made += 1;
        if self.requests_made == 1 {
            return;
        }
        let jitter = if self.config.delay_jitter_ms > 0 {
            rng().random_range(0..=self.config.delay_jitter_ms)
        } else {
            0
        };
        let delay = self.config.request_delay() + Duration::from_millis(jitter);
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

/// Fetch the first listing page and report how many paper links it has.
///
/// # Arguments
///
/// * `fetcher` - Transport used for the single request
/// * `config` - Supplies the base URL and page size
/// * `query` - Search text sent with the listing request
///
/// # Returns
///
/// The number of paper links on page 1, or the [`ScrapeError::Fetch`] that
/// shows the site cannot be reached.
///
/// [`ScrapeError::Fetch`]: crate::error::ScrapeError::Fetch
#[instrument(level = "info", skip(fetcher, config))]
pub async fn check_connectivity<F: Fetch>(fetcher: &F, config: &ScraperConfig, query: &str) -> Result<usize> {
    let base = Url::parse(&config.base_url)?;
    let url = listing_url(&config.base_url, 1, config.per_page, query);
    let html = fetcher.get_text(&url).await?;
    let count = parse_listing(&html, &base).len();
    info!(%url, links = count, "Listing page reachable");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use crate::filters::dates::parse_date;
    use crate::scrapers::nber::fixtures::{detail_html, listing_html};
    use std::cell::RefCell;
    use std::collections::HashMap;

    const BASE: &str = "https://www.nber.org";

    /// In-memory site: URL → body. Unknown URLs fail like a 404.
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, String>,
        files: HashMap<String, Vec<u8>>,
        requests: RefCell<Vec<String>>,
    }

    impl FakeSite {
        fn listing(&mut self, page: usize, query: &str, ids: &[&str]) {
            self.pages
                .insert(listing_url(BASE, page, 100, query), listing_html(ids));
        }

        fn detail(&mut self, id: &str, title: &str, date: Option<&str>) {
            self.pages.insert(
                format!("{BASE}/papers/{id}"),
                detail_html(title, &["Jane Doe"], date, "An abstract."),
            );
        }

        fn requested(&self, url: &str) -> bool {
            self.requests.borrow().iter().any(|r| r == url)
        }
    }

    impl Fetch for FakeSite {
        async fn get_text(&self, url: &str) -> Result<String> {
            self.requests.borrow_mut().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| ScrapeError::fetch(url, "HTTP 404 Not Found"))
        }

        async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
            self.requests.borrow_mut().push(url.to_string());
            self.files
                .get(url)
                .cloned()
                .ok_or_else(|| ScrapeError::fetch(url, "HTTP 404 Not Found"))
        }
    }

    fn config() -> ScraperConfig {
        ScraperConfig {
            request_delay_ms: 0,
            delay_jitter_ms: 0,
            ..ScraperConfig::default()
        }
    }

    fn settings(query: &str) -> CrawlSettings {
        CrawlSettings {
            query: query.to_string(),
            ..CrawlSettings::default()
        }
    }

    async fn crawl(site: &FakeSite, config: &ScraperConfig, settings: &CrawlSettings) -> CrawlOutcome {
        Crawler::new(site, config, settings).unwrap().run().await
    }

    fn ids(outcome: &CrawlOutcome) -> Vec<&str> {
        outcome.papers.iter().map(|p| p.paper_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_keeps_matches_in_listing_order() {
        let mut site = FakeSite::default();
        site.listing(1, "AI", &["w3", "w2", "w1"]);
        site.listing(2, "AI", &[]);
        site.detail("w3", "AI and Growth", None);
        site.detail("w2", "Terrain Ruggedness", None);
        site.detail("w1", "Deep Learning for Asset Pricing", None);

        let outcome = crawl(&site, &config(), &settings("AI")).await;
        assert_eq!(ids(&outcome), ["w3", "w1"]);
        assert_eq!(outcome.papers_checked, 3);
        assert_eq!(outcome.stop_reason, Some(StopReason::ListingExhausted));
    }

    #[tokio::test]
    async fn test_page_limit_bounds_papers_examined() {
        let mut site = FakeSite::default();
        for page in 1..=3 {
            let page_ids: Vec<String> = (0..100).map(|i| format!("w{}", page * 1000 + i)).collect();
            let refs: Vec<&str> = page_ids.iter().map(String::as_str).collect();
            site.listing(page, "nonexistent", &refs);
            for id in &refs {
                site.detail(id, "Unrelated Title", None);
            }
        }
        let settings = CrawlSettings {
            query: "nonexistent".to_string(),
            max_pages: Some(2),
            max_results: Some(1000),
            ..CrawlSettings::default()
        };

        let outcome = crawl(&site, &config(), &settings).await;
        assert_eq!(outcome.papers_checked, 200);
        assert_eq!(outcome.pages_visited, 2);
        assert!(outcome.papers.is_empty());
        assert_eq!(outcome.stop_reason, Some(StopReason::PageLimit));
        assert!(!site.requested(&listing_url(BASE, 3, 100, "nonexistent")));
    }

    #[tokio::test]
    async fn test_max_results_stops_early() {
        let mut site = FakeSite::default();
        site.listing(1, "", &["w1", "w2", "w3"]);
        for id in ["w1", "w2", "w3"] {
            site.detail(id, "Anything", None);
        }
        let settings = CrawlSettings {
            max_results: Some(2),
            ..CrawlSettings::default()
        };

        let outcome = crawl(&site, &config(), &settings).await;
        assert_eq!(ids(&outcome), ["w1", "w2"]);
        assert_eq!(outcome.stop_reason, Some(StopReason::MaxResults));
        assert!(!site.requested(&format!("{BASE}/papers/w3")));
    }

    #[tokio::test]
    async fn test_checked_cap_stops_early() {
        let mut site = FakeSite::default();
        site.listing(1, "", &["w1", "w2", "w3", "w4"]);
        for id in ["w1", "w2", "w3", "w4"] {
            site.detail(id, "Anything", None);
        }
        let config = ScraperConfig {
            max_papers_checked: 3,
            ..config()
        };

        let outcome = crawl(&site, &config, &settings("")).await;
        assert_eq!(outcome.papers_checked, 3);
        assert_eq!(outcome.stop_reason, Some(StopReason::CheckedCap));
    }

    #[tokio::test]
    async fn test_max_results_checked_before_cap() {
        let mut site = FakeSite::default();
        site.listing(1, "", &["w1", "w2"]);
        site.detail("w1", "A", None);
        site.detail("w2", "B", None);
        let config = ScraperConfig {
            max_papers_checked: 2,
            ..config()
        };
        let settings = CrawlSettings {
            max_results: Some(2),
            ..CrawlSettings::default()
        };

        let outcome = crawl(&site, &config, &settings).await;
        assert_eq!(outcome.stop_reason, Some(StopReason::MaxResults));
    }

    #[tokio::test]
    async fn test_failed_detail_page_is_skipped() {
        let mut site = FakeSite::default();
        site.listing(1, "", &["w1", "w2", "w3"]);
        site.listing(2, "", &[]);
        site.detail("w1", "First", None);
        site.detail("w3", "Third", None);

        let outcome = crawl(&site, &config(), &settings("")).await;
        assert_eq!(ids(&outcome), ["w1", "w3"]);
        assert_eq!(outcome.detail_failures, 1);
        assert_eq!(outcome.papers_checked, 3);
    }

    #[tokio::test]
    async fn test_failed_listing_page_does_not_abort() {
        let mut site = FakeSite::default();
        site.listing(2, "", &["w5"]);
        site.listing(3, "", &[]);
        site.detail("w5", "Survivor", None);

        let outcome = crawl(&site, &config(), &settings("")).await;
        assert_eq!(ids(&outcome), ["w5"]);
        assert_eq!(outcome.page_failures, 1);
        assert_eq!(outcome.pages_visited, 3);
    }

    #[tokio::test]
    async fn test_all_pages_failing_returns_empty() {
        let site = FakeSite::default();
        let outcome = crawl(&site, &config(), &settings("AI")).await;
        assert!(outcome.papers.is_empty());
        assert_eq!(outcome.page_failures, 3);
        assert_eq!(outcome.stop_reason, Some(StopReason::TooManyPageFailures));
    }

    #[tokio::test]
    async fn test_duplicates_across_pages_are_skipped() {
        let mut site = FakeSite::default();
        site.listing(1, "", &["w1", "w2"]);
        site.listing(2, "", &["w2", "w3"]);
        site.listing(3, "", &["w3"]);
        for id in ["w1", "w2", "w3"] {
            site.detail(id, "Paper", None);
        }

        let outcome = crawl(&site, &config(), &settings("")).await;
        assert_eq!(ids(&outcome), ["w1", "w2", "w3"]);
        assert_eq!(outcome.papers_checked, 3);
        assert_eq!(outcome.stop_reason, Some(StopReason::ListingExhausted));
    }

    #[tokio::test]
    async fn test_date_range_filters_papers() {
        let mut site = FakeSite::default();
        site.listing(1, "", &["w1", "w2", "w3"]);
        site.listing(2, "", &[]);
        site.detail("w1", "In range", Some("2023/06/15"));
        site.detail("w2", "Too early", Some("2022/12/31"));
        site.detail("w3", "Unknown date", None);

        let settings = CrawlSettings {
            date_range: DateRange {
                start: parse_date("2023-01-01").ok(),
                end: parse_date("2023-12-31").ok(),
            },
            ..CrawlSettings::default()
        };
        let outcome = crawl(&site, &config(), &settings).await;
        assert_eq!(ids(&outcome), ["w1", "w3"]);
    }

    #[tokio::test]
    async fn test_pdf_download_and_failure_keeps_paper() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_url = "https://www.nber.org/system/files/working_papers/x/x.pdf";

        let mut site = FakeSite::default();
        site.listing(1, "", &["w1", "w2"]);
        site.listing(2, "", &[]);
        site.detail("w1", "First", None);
        site.detail("w2", "Second", None);
        site.files.insert(pdf_url.to_string(), b"%PDF-1.4".to_vec());

        let config = ScraperConfig {
            download_dir: dir.path().join("pdfs").to_string_lossy().into_owned(),
            ..config()
        };
        let settings = CrawlSettings {
            download_pdfs: true,
            ..CrawlSettings::default()
        };

        let outcome = crawl(&site, &config, &settings).await;
        assert_eq!(ids(&outcome), ["w1", "w2"]);
        assert_eq!(outcome.pdfs_downloaded, 2);
        let saved = std::fs::read(dir.path().join("pdfs").join("w1.pdf")).unwrap();
        assert_eq!(saved, b"%PDF-1.4");

        // Both fixture pages share one PDF URL; removing it fails both downloads.
        site.files.clear();
        let outcome = crawl(&site, &config, &settings).await;
        assert_eq!(ids(&outcome), ["w1", "w2"]);
        assert_eq!(outcome.pdf_failures, 2);
        assert_eq!(outcome.pdfs_downloaded, 0);
    }

    #[tokio::test]
    async fn test_shutdown_returns_papers_kept_so_far() {
        let mut site = FakeSite::default();
        site.listing(1, "", &["w1", "w2"]);
        site.listing(2, "", &["w3"]);
        site.listing(3, "", &["w4"]);
        for id in ["w1", "w2", "w3", "w4"] {
            site.detail(id, "Paper", None);
        }

        // Fires once page 2 has been requested; page 2 itself still completes.
        let page_two = listing_url(BASE, 2, 100, "");
        let shutdown = async {
            while !site.requested(&page_two) {
                tokio::task::yield_now().await;
            }
        };

        let outcome = Crawler::new(&site, &config(), &settings(""))
            .unwrap()
            .run_until(shutdown)
            .await;
        assert_eq!(ids(&outcome), ["w1", "w2", "w3"]);
        assert_eq!(outcome.stop_reason, Some(StopReason::Interrupted));
        assert!(!site.requested(&listing_url(BASE, 3, 100, "")));
    }

    #[tokio::test]
    async fn test_progress_snapshot_every_n_matches() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("nber_all_progress.json");

        let mut site = FakeSite::default();
        site.listing(1, "", &["w1", "w2", "w3"]);
        site.listing(2, "", &[]);
        for id in ["w1", "w2", "w3"] {
            site.detail(id, "Paper", None);
        }
        let config = ScraperConfig {
            progress_every: 2,
            ..config()
        };
        let settings = CrawlSettings {
            progress_path: Some(snapshot.clone()),
            ..CrawlSettings::default()
        };

        let outcome = crawl(&site, &config, &settings).await;
        assert_eq!(outcome.papers.len(), 3);
        let saved = json::read_papers(&snapshot).await.unwrap();
        let saved_ids: Vec<&str> = saved.iter().map(|p| p.paper_id.as_str()).collect();
        assert_eq!(saved_ids, ["w1", "w2"]);
    }

    #[tokio::test]
    async fn test_no_snapshot_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("progress.json");

        let mut site = FakeSite::default();
        site.listing(1, "", &["w1", "w2"]);
        site.detail("w1", "Paper", None);
        site.detail("w2", "Paper", None);
        let config = ScraperConfig {
            progress_every: 0,
            ..config()
        };
        let settings = CrawlSettings {
            progress_path: Some(snapshot.clone()),
            ..CrawlSettings::default()
        };

        crawl(&site, &config, &settings).await;
        assert!(!snapshot.exists());
    }

    #[tokio::test]
    async fn test_paced_from_start_delays_first_request() {
        let mut site = FakeSite::default();
        site.listing(1, "", &[]);
        let config = ScraperConfig {
            request_delay_ms: 50,
            ..config()
        };

        let started = std::time::Instant::now();
        let outcome = Crawler::new(&site, &config, &settings(""))
            .unwrap()
            .paced_from_start()
            .run()
            .await;
        assert_eq!(outcome.stop_reason, Some(StopReason::ListingExhausted));
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_check_connectivity_counts_links() {
        let mut site = FakeSite::default();
        site.listing(1, "test", &["w1", "w2"]);
        let count = check_connectivity(&site, &config(), "test").await.unwrap();
        assert_eq!(count, 2);

        let err = check_connectivity(&FakeSite::default(), &config(), "test")
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }));
    }
}
