//! Scraper settings.
//!
//! Settings come from three layers, later ones winning:
//! 1. [`ScraperConfig::default`]
//! 2. an optional YAML file passed with `--config`
//! 3. command-line flags (applied in `main`)
//!
//! # Example
//!
//! ```yaml
//! base_url: https://www.nber.org
//! request_delay_ms: 1500
//! per_page: 100
//! max_papers_checked: 2000
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

use crate::error::{Result, ScrapeError};

pub const DEFAULT_BASE_URL: &str = "https://www.nber.org";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Site, politeness and output settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Root of the NBER site.
    pub base_url: String,
    /// Pause between consecutive requests.
    pub request_delay_ms: u64,
    /// Upper bound of the random extra pause added to each delay.
    pub delay_jitter_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Papers requested per listing page.
    pub per_page: usize,
    /// Safety cap on papers examined in one run.
    pub max_papers_checked: usize,
    /// Stop after this many listing pages fail in a row.
    pub max_consecutive_page_failures: usize,
    /// Save a snapshot of kept papers after every this many matches; 0 disables.
    pub progress_every: usize,
    /// Directory for JSON output.
    pub output_dir: String,
    /// Directory for downloaded PDFs.
    pub download_dir: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_delay_ms: 1500,
            delay_jitter_ms: 250,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            per_page: 100,
            max_papers_checked: 2000,
            max_consecutive_page_failures: 3,
            progress_every: 10,
            output_dir: "data".to_string(),
            download_dir: "downloads".to_string(),
        }
    }
}

impl ScraperConfig {
    /// Load settings from a YAML file, or defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| ScrapeError::config(format!("cannot read config file {path}: {e}")))?;
        let config = Self::from_yaml_str(&raw)?;
        info!(path, base_url = %config.base_url, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)?;
        if self.per_page == 0 {
            return Err(ScrapeError::config("per_page must be at least 1"));
        }
        if self.max_papers_checked == 0 {
            return Err(ScrapeError::config("max_papers_checked must be at least 1"));
        }
        if self.max_consecutive_page_failures == 0 {
            return Err(ScrapeError::config(
                "max_consecutive_page_failures must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
