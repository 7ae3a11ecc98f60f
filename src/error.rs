//! Error taxonomy for the scraper.
//!
//! Per-unit failures ([`ScrapeError::Fetch`], [`ScrapeError::Parse`]) are
//! caught by the crawler and logged; everything else surfaces to `main`.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Network failure or non-success HTTP status.
    #[error("fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Expected markup was missing from a page.
    #[error("parse failed for {url}: {message}")]
    Parse { url: String, message: String },

    /// A date string was not `YYYY/MM/DD` or `YYYY-MM-DD`.
    #[error("invalid date '{input}': expected YYYY/MM/DD or YYYY-MM-DD")]
    DateParse { input: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),

    /// The run was stopped before it finished.
    #[error("interrupted after keeping {papers} papers")]
    Interrupted { papers: usize },
}

impl ScrapeError {
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn parse(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn date(input: impl Into<String>) -> Self {
        Self::DateParse {
            input: input.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for failures the crawler recovers from by skipping one unit.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Parse { .. })
    }
}
