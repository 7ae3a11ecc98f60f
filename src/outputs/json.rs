//! JSON output for scraped papers.
//!
//! A run writes one file: a pretty-printed array of [`Paper`] objects in
//! discovery order. Writing replaces any previous file at the same path, and
//! the same papers always produce the same bytes.
//!
//! Papers collected by a run that did not finish normally are saved under a
//! [`Checkpoint`] name instead.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── nber_ai_papers.json        # finished run
//! ├── nber_ai_progress.json      # snapshot while crawling
//! ├── nber_ai_interrupted.json   # Ctrl-C
//! └── nber_ai_error.json         # final write failed
//! ```

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, error, info, instrument, warn};

use crate::error::Result;
use crate::models::Paper;
use crate::utils::safe_query;

/// Why papers are saved before a run has finished normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// Periodic snapshot during the crawl.
    Progress,
    /// The run was stopped with Ctrl-C.
    Interrupted,
    /// Writing the requested output file failed.
    Error,
}

impl Checkpoint {
    fn suffix(self) -> &'static str {
        match self {
            Self::Progress => "progress",
            Self::Interrupted => "interrupted",
            Self::Error => "error",
        }
    }
}

fn file_stem(query: &str) -> String {
    let safe = safe_query(query);
    if safe.is_empty() {
        "nber_all".to_string()
    } else {
        format!("nber_{safe}")
    }
}

/// File name used when the user does not pass `--output`.
pub fn default_output_name(query: &str) -> String {
    format!("{}_papers.json", file_stem(query))
}

/// Path of the `kind` checkpoint file for `query` inside `output_dir`.
pub fn checkpoint_path(output_dir: &str, query: &str, kind: Checkpoint) -> PathBuf {
    Path::new(output_dir).join(format!("{}_{}.json", file_stem(query), kind.suffix()))
}

/// Resolve the output path: absolute or nested names are kept as given,
/// bare file names land in `output_dir`.
pub fn output_path(output_dir: &str, output: Option<&str>, query: &str) -> PathBuf {
    match output {
        Some(name) => {
            let path = Path::new(name);
            if path.is_absolute() || path.parent().is_some_and(|p| !p.as_os_str().is_empty()) {
                path.to_path_buf()
            } else {
                Path::new(output_dir).join(path)
            }
        }
        None => Path::new(output_dir).join(default_output_name(query)),
    }
}

/// Serialize papers to the JSON document written by [`write_papers`].
pub fn to_json(papers: &[Paper]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(papers)?;
    json.push('\n');
    Ok(json)
}

/// Write `papers` to `path` as a pretty-printed JSON array.
///
/// Parent directories are created as needed and an existing file is
/// replaced.
///
/// # Arguments
///
/// * `papers` - Papers in discovery order
/// * `path` - Destination file
///
/// # Returns
///
/// `Ok(())` on success, or an error if directory creation, serialization or
/// the write fails.
#[instrument(level = "info", skip(papers), fields(count = papers.len()))]
pub async fn write_papers(papers: &[Paper], path: &Path) -> Result<()> {
    let json = to_json(papers)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(path = %path.display(), "Wrote papers JSON");
    Ok(())
}

/// Remove a progress snapshot once the final output has been written.
///
/// A missing file is fine; any other failure is only logged.
pub async fn discard_checkpoint(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed progress snapshot"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Could not remove progress snapshot"),
    }
}

/// Read a file previously produced by [`write_papers`].
#[instrument(level = "info")]
pub async fn read_papers(path: &Path) -> Result<Vec<Paper>> {
    let raw = fs::read_to_string(path).await?;
    let papers: Vec<Paper> = serde_json::from_str(&raw)?;
    info!(count = papers.len(), "Loaded papers JSON");
    Ok(papers)
}
