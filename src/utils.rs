//! Small helpers for logging, file naming and output directories.

use std::path::Path;

use tokio::fs;
use tracing::{debug, instrument, warn};

use crate::error::Result;

const WRITE_CHECK_FILE: &str = ".nber_scraper_write_check";

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Reduce a search query to a file-name-safe fragment.
///
/// Keeps alphanumerics, spaces, `-` and `_`, trims, turns spaces into `_`
/// and lowercases.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(safe_query("Machine Learning!"), "machine_learning");
/// ```
pub fn safe_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
        .to_lowercase()
}

/// Create `dir` if needed and confirm files can be written into it.
///
/// A throwaway marker file is written and removed again; failing to remove it
/// is only logged.
///
/// # Arguments
///
/// * `dir` - Directory that will receive output files
///
/// # Returns
///
/// `Ok(())` when the marker was written, or [`ScrapeError::Io`] when the
/// directory cannot be created or written to.
///
/// [`ScrapeError::Io`]: crate::error::ScrapeError::Io
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub async fn ensure_writable_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).await?;

    let marker = dir.join(WRITE_CHECK_FILE);
    fs::write(&marker, b"").await?;
    if let Err(e) = fs::remove_file(&marker).await {
        warn!(path = %marker.display(), error = %e, "Could not remove write-check file");
    }
    debug!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let result = truncate_for_log("Économie après-guerre", 3);
        assert!(result.starts_with("Éco…"));
    }

    #[test]
    fn test_safe_query() {
        assert_eq!(safe_query("AI"), "ai");
        assert_eq!(safe_query("Machine Learning!"), "machine_learning");
        assert_eq!(safe_query("  labor-market_data "), "labor-market_data");
        assert_eq!(safe_query("a/b\\c"), "abc");
        assert_eq!(safe_query(""), "");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data/out");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join(WRITE_CHECK_FILE).exists());
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_under_a_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("papers.json");
        std::fs::write(&file, "[]").unwrap();

        let err = ensure_writable_dir(&file.join("out")).await.unwrap_err();
        assert!(matches!(err, crate::error::ScrapeError::Io(_)));
    }
}
