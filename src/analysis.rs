//! Summary statistics over a saved paper collection.
//!
//! [`Analysis::from_papers`] is pure; loading and rendering live in
//! [`crate::outputs`]. Rankings break ties alphabetically so the same input
//! always yields the same report.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::Paper;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-zA-Z]+\b").expect("valid word regex"));

const MIN_KEYWORD_LEN: usize = 4;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "this", "that", "with", "from", "they", "have", "been", "their", "are", "was",
        "were", "will", "would", "could", "should", "may", "might", "can", "does", "did", "has",
        "had", "also", "more", "most", "some", "any", "and", "but", "for", "not", "you", "all",
        "each", "one", "two", "both", "between", "among", "within", "without", "through",
        "during", "before", "after", "above", "below", "into", "onto", "upon", "over", "under",
        "paper", "study", "research", "analysis", "data", "results", "find", "found", "show",
        "shows", "using", "used", "use", "based", "approach", "these", "than", "which", "when",
        "while", "such", "other", "there", "where", "what", "only",
    ]
    .into_iter()
    .collect()
});

/// Word counts of abstracts: fewest, mean, most.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbstractLengths {
    pub min: usize,
    pub avg: f64,
    pub max: usize,
}

/// Everything the `analyze` command reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub total_papers: usize,
    pub with_abstracts: usize,
    pub with_pdf_urls: usize,
    pub with_authors: usize,
    pub with_dates: usize,
    pub total_authors: usize,
    pub unique_authors: usize,
    pub avg_authors_per_paper: f64,
    pub abstract_lengths: Option<AbstractLengths>,
    pub earliest_scrape: Option<DateTime<Utc>>,
    pub latest_scrape: Option<DateTime<Utc>>,
    /// Papers per publication year, ascending by year.
    pub by_year: BTreeMap<i32, usize>,
    pub top_authors: Vec<(String, usize)>,
    pub top_keywords: Vec<(String, usize)>,
}

impl Analysis {
    pub fn from_papers(papers: &[Paper], top_n: usize) -> Self {
        let total_papers = papers.len();
        let total_authors: usize = papers.iter().map(|p| p.authors.len()).sum();
        let unique_authors = papers
            .iter()
            .flat_map(|p| p.authors.iter())
            .unique()
            .count();

        let lengths: Vec<usize> = papers
            .iter()
            .filter_map(|p| p.abstract_text.as_deref())
            .filter(|a| !a.trim().is_empty())
            .map(|a| a.split_whitespace().count())
            .collect();
        let abstract_lengths = match (lengths.iter().min(), lengths.iter().max()) {
            (Some(&min), Some(&max)) => Some(AbstractLengths {
                min,
                avg: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
                max,
            }),
            _ => None,
        };

        let by_year = papers
            .iter()
            .filter_map(|p| p.date)
            .map(|d| d.year())
            .counts()
            .into_iter()
            .collect();

        Self {
            total_papers,
            with_abstracts: papers.iter().filter(|p| p.has_abstract()).count(),
            with_pdf_urls: papers.iter().filter(|p| p.has_pdf()).count(),
            with_authors: papers.iter().filter(|p| !p.authors.is_empty()).count(),
            with_dates: papers.iter().filter(|p| p.date.is_some()).count(),
            total_authors,
            unique_authors,
            avg_authors_per_paper: if total_papers == 0 {
                0.0
            } else {
                total_authors as f64 / total_papers as f64
            },
            abstract_lengths,
            earliest_scrape: papers.iter().map(|p| p.scraped_at).min(),
            latest_scrape: papers.iter().map(|p| p.scraped_at).max(),
            by_year,
            top_authors: top_authors(papers, top_n),
            top_keywords: top_keywords(papers, top_n),
        }
    }
}

/// Most frequent authors, ties broken by name.
pub fn top_authors(papers: &[Paper], top_n: usize) -> Vec<(String, usize)> {
    rank(
        papers
            .iter()
            .flat_map(|p| p.authors.iter().map(String::as_str))
            .counts(),
        top_n,
    )
}

/// Most frequent abstract words, ignoring short words and stop words.
pub fn top_keywords(papers: &[Paper], top_n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in papers.iter().filter_map(|p| p.abstract_text.as_deref()) {
        let lower = text.to_lowercase();
        for word in WORD.find_iter(&lower).map(|m| m.as_str()) {
            if word.len() >= MIN_KEYWORD_LEN && !STOP_WORDS.contains(word) {
                *counts.entry(word.to_string()).or_default() += 1;
            }
        }
    }
    rank(counts, top_n)
}

fn rank<K: AsRef<str>>(counts: HashMap<K, usize>, top_n: usize) -> Vec<(String, usize)> {
    counts
        .into_iter()
        .map(|(k, n)| (k.as_ref().to_string(), n))
        .sorted_by(|(a, na), (b, nb)| nb.cmp(na).then_with(|| a.cmp(b)))
        .take(top_n)
        .collect()
}
