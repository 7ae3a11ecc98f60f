//! Text and Markdown rendering of an [`Analysis`].
//!
//! The terminal report draws horizontal bar charts with block characters; the
//! Markdown report is what `analyze --output-dir` saves next to a JSON dump of
//! the raw numbers and a one-row-per-paper CSV table.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── analysis_report.md
//! ├── analysis_summary.json
//! └── papers_data.csv
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use tokio::fs;
use tracing::{info, instrument};

use crate::analysis::Analysis;
use crate::error::{Result, ScrapeError};
use crate::models::Paper;

const BAR_WIDTH: usize = 40;
const BAR_CHAR: &str = "█";

pub const REPORT_FILE: &str = "analysis_report.md";
pub const SUMMARY_FILE: &str = "analysis_summary.json";
pub const PAPERS_CSV: &str = "papers_data.csv";

const CSV_COLUMNS: [&str; 13] = [
    "paper_id",
    "title",
    "authors",
    "num_authors",
    "date",
    "year",
    "url",
    "pdf_url",
    "has_abstract",
    "has_pdf",
    "abstract_length",
    "scraped_at",
    "abstract",
];

/// One CSV row; field order matches [`CSV_COLUMNS`].
#[derive(Debug, Serialize)]
struct PaperRow<'a> {
    paper_id: &'a str,
    title: &'a str,
    authors: String,
    num_authors: usize,
    date: Option<NaiveDate>,
    year: Option<i32>,
    url: Option<&'a str>,
    pdf_url: Option<&'a str>,
    has_abstract: bool,
    has_pdf: bool,
    abstract_length: usize,
    scraped_at: String,
    #[serde(rename = "abstract")]
    abstract_text: Option<&'a str>,
}

impl<'a> From<&'a Paper> for PaperRow<'a> {
    fn from(paper: &'a Paper) -> Self {
        Self {
            paper_id: &paper.paper_id,
            title: &paper.title,
            authors: paper.authors.join(", "),
            num_authors: paper.authors.len(),
            date: paper.date,
            year: paper.date.map(|d| d.year()),
            url: paper.url.as_deref(),
            pdf_url: paper.pdf_url.as_deref(),
            has_abstract: paper.has_abstract(),
            has_pdf: paper.has_pdf(),
            abstract_length: paper
                .abstract_text
                .as_deref()
                .map_or(0, |a| a.split_whitespace().count()),
            scraped_at: paper.scraped_at.to_rfc3339(),
            abstract_text: paper.abstract_text.as_deref(),
        }
    }
}

/// Scale `count` against `max` into a bar at most `width` cells wide.
///
/// Any non-zero count gets at least one cell.
pub fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    BAR_CHAR.repeat((count.min(max) * width).div_ceil(max))
}

fn bar_chart<L: std::fmt::Display>(out: &mut String, rows: &[(L, usize)]) {
    let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let label_width = rows.iter().map(|(l, _)| l.to_string().chars().count()).max().unwrap_or(0);
    for (label, count) in rows {
        let label = label.to_string();
        let _ = writeln!(
            out,
            "  {label:<label_width$} │{} {count}",
            bar(*count, max, BAR_WIDTH)
        );
    }
}

/// Plain-text report for the terminal.
pub fn render_text(analysis: &Analysis, top_n: usize) -> String {
    let mut out = String::new();

    out.push_str("Basic Statistics:\n");
    for (label, value) in summary_rows(analysis) {
        let _ = writeln!(out, "  {label}: {value}");
    }

    out.push_str("\nPapers by Year:\n");
    if analysis.by_year.is_empty() {
        out.push_str("  (no dated papers)\n");
    } else {
        let rows: Vec<(i32, usize)> = analysis.by_year.iter().map(|(y, n)| (*y, *n)).collect();
        bar_chart(&mut out, &rows);
    }

    let _ = writeln!(out, "\nTop {top_n} Authors:");
    if analysis.top_authors.is_empty() {
        out.push_str("  (no authors)\n");
    } else {
        bar_chart(&mut out, &analysis.top_authors);
    }

    let _ = writeln!(out, "\nTop {top_n} Keywords:");
    for (i, (word, count)) in analysis.top_keywords.iter().enumerate() {
        let _ = writeln!(out, "  {:2}. {word}: {count} occurrences", i + 1);
    }
    out
}

/// Markdown report saved by `analyze --output-dir`.
pub fn render_markdown(analysis: &Analysis, source: &str, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str("# NBER Papers Analysis Report\n\n");
    let _ = writeln!(out, "Source: `{source}`  ");
    let _ = writeln!(out, "Generated on: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S UTC"));

    out.push_str("## Summary Statistics\n\n");
    for (label, value) in summary_rows(analysis) {
        let _ = writeln!(out, "- {label}: {value}");
    }

    out.push_str("\n## Papers by Year\n\n");
    out.push_str("| Year | Papers |\n|------|--------|\n");
    for (year, count) in &analysis.by_year {
        let _ = writeln!(out, "| {year} | {count} |");
    }

    out.push_str("\n## Top Authors\n\n");
    for (i, (author, count)) in analysis.top_authors.iter().enumerate() {
        let _ = writeln!(out, "{}. {author}: {count} papers", i + 1);
    }

    out.push_str("\n## Common Keywords\n\n");
    for (i, (word, count)) in analysis.top_keywords.iter().enumerate() {
        let _ = writeln!(out, "{}. {word}: {count} occurrences", i + 1);
    }
    out
}

fn summary_rows(analysis: &Analysis) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Total papers", analysis.total_papers.to_string()),
        ("Papers with abstracts", analysis.with_abstracts.to_string()),
        ("Papers with PDF URLs", analysis.with_pdf_urls.to_string()),
        ("Papers with authors", analysis.with_authors.to_string()),
        ("Papers with dates", analysis.with_dates.to_string()),
        ("Unique authors", analysis.unique_authors.to_string()),
        (
            "Average authors per paper",
            format!("{:.1}", analysis.avg_authors_per_paper),
        ),
    ];
    if let Some(lengths) = &analysis.abstract_lengths {
        rows.push((
            "Abstract length (words)",
            format!("min {} / avg {:.1} / max {}", lengths.min, lengths.avg, lengths.max),
        ));
    }
    if let (Some(first), Some(last)) = (analysis.earliest_scrape, analysis.latest_scrape) {
        rows.push(("Scraped between", format!("{} and {}", first.to_rfc3339(), last.to_rfc3339())));
    }
    rows
}

/// Render `papers` as CSV, header row first, one row per paper.
pub fn papers_csv(papers: &[Paper]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS)?;
    for paper in papers {
        writer.serialize(PaperRow::from(paper))?;
    }
    writer
        .into_inner()
        .map_err(|e| ScrapeError::Io(e.into_error()))
}

/// Save the Markdown report, JSON summary and per-paper CSV into `output_dir`.
///
/// # Arguments
///
/// * `analysis` - Statistics computed from `papers`
/// * `papers` - The analyzed papers, one CSV row each
/// * `source` - Input file name quoted in the report
/// * `output_dir` - Created if missing; existing report files are replaced
///
/// # Returns
///
/// The path of the Markdown report, or an error if any file cannot be written.
#[instrument(level = "info", skip(analysis, papers))]
pub async fn write_report(
    analysis: &Analysis,
    papers: &[Paper],
    source: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).await?;

    let report_path = output_dir.join(REPORT_FILE);
    fs::write(&report_path, render_markdown(analysis, source, Utc::now())).await?;

    let summary_path = output_dir.join(SUMMARY_FILE);
    let mut summary = serde_json::to_string_pretty(analysis)?;
    summary.push('\n');
    fs::write(&summary_path, summary).await?;

    let csv_path = output_dir.join(PAPERS_CSV);
    fs::write(&csv_path, papers_csv(papers)?).await?;

    info!(
        report = %report_path.display(),
        summary = %summary_path.display(),
        csv = %csv_path.display(),
        "Wrote analysis report"
    );
    Ok(report_path)
}
