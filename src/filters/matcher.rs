//! Keyword matching over a paper's title, abstract and authors.
//!
//! Matching is case-insensitive and whole-word: an occurrence only counts when
//! the characters on both sides of it are not alphanumeric. "AI" matches
//! "AI policy" but not "Terrain" or "available".
//!
//! A few queries carry a synonym set (see [`SYNONYMS`]); the query matches when
//! either the query itself or any of its synonyms matches.
//!
//! # Multi-word queries
//!
//! [`MatchMode::Phrase`] (the default) requires the whole phrase to appear
//! with word boundaries at both ends; whitespace inside the phrase and inside
//! the searched text is collapsed first. [`MatchMode::AllTokens`] instead
//! requires each whitespace-separated token to appear somewhere on its own.

use std::collections::HashMap;

use clap::ValueEnum;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::models::Paper;

const AI_SYNONYMS: &[&str] = &[
    "artificial intelligence",
    "machine learning",
    "deep learning",
    "neural network",
    "algorithm",
];

/// Alternate terms that also satisfy a query, keyed by normalized query.
pub static SYNONYMS: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| HashMap::from([("ai", AI_SYNONYMS)]));

/// How a multi-word query is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// The full phrase must appear as a delimited run of words.
    #[default]
    Phrase,
    /// Every token must appear as a delimited word, anywhere.
    AllTokens,
}

/// A query compiled once and applied to many papers.
#[derive(Debug, Clone)]
pub struct Matcher {
    query: String,
    mode: MatchMode,
    synonyms: &'static [&'static str],
}

impl Matcher {
    pub fn new(query: &str, mode: MatchMode) -> Self {
        let query = normalize(query);
        let synonyms = SYNONYMS.get(query.as_str()).copied().unwrap_or(&[]);
        Self {
            query,
            mode,
            synonyms,
        }
    }

    /// An empty query accepts every paper.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn is_match(&self, paper: &Paper) -> bool {
        self.matches_fields(&paper.title, paper.abstract_text.as_deref(), &paper.authors)
    }

    pub fn matches_fields(&self, title: &str, abstract_text: Option<&str>, authors: &[String]) -> bool {
        if self.is_empty() {
            return true;
        }
        let fields = searchable_fields(title, abstract_text, authors);
        let in_any_field = |term: &str| fields.iter().any(|field| contains_word(field, term));

        let primary = match self.mode {
            MatchMode::Phrase => in_any_field(&self.query),
            MatchMode::AllTokens => self.query.split(' ').all(|token| in_any_field(token)),
        };

        primary || self.synonyms.iter().any(|term| in_any_field(term))
    }
}

/// Decide whether `query` matches the given fields, using phrase mode.
pub fn matches(query: &str, title: &str, abstract_text: Option<&str>, authors: &[String]) -> bool {
    Matcher::new(query, MatchMode::Phrase).matches_fields(title, abstract_text, authors)
}

/// Lowercase and collapse whitespace runs to single spaces.
fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Normalized title, abstract and author names, each searched on its own.
fn searchable_fields(title: &str, abstract_text: Option<&str>, authors: &[String]) -> Vec<String> {
    std::iter::once(title)
        .chain(abstract_text)
        .chain(authors.iter().map(String::as_str))
        .map(normalize)
        .filter(|field| !field.is_empty())
        .collect()
}

/// Whole-word containment over already-normalized text.
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(needle) {
        let start = from + offset;
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        // Advance one char so overlapping candidates are still considered.
        from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::paper;

    #[test]
    fn test_whole_word_rejects_substring() {
        assert!(!matches("AI", "Terrain studies", None, &[]));
        assert!(!matches("AI", "Rain and available credit", None, &[]));
        assert!(matches("AI", "AI policy", None, &[]));
    }

    #[test]
    fn test_synonym_expansion() {
        assert!(matches("AI", "Deep Learning for Asset Pricing", None, &[]));
        assert!(matches("ai", "Optimal Algorithm Design", None, &[]));
        assert!(!matches("AI", "Algorithms and Markets", None, &[]));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(matches("ai", "AI and Growth", None, &[]));
        assert!(matches("TARIFFS", "Trade tariffs revisited", None, &[]));
    }

    #[test]
    fn test_matches_abstract_and_authors() {
        let abstract_text = "We study how generative AI changes hiring.";
        assert!(matches("AI", "Hiring", Some(abstract_text), &[]));

        let authors = vec!["Daron Acemoglu".to_string()];
        assert!(matches("acemoglu", "Institutions", None, &authors));
    }

    #[test]
    fn test_punctuation_is_a_boundary() {
        assert!(matches("AI", "Returns to (AI)-adoption", None, &[]));
        assert!(matches("AI", "AI", None, &[]));
        assert!(!matches("AI", "AI2 benchmarks", None, &[]));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(matches("", "Anything", None, &[]));
        assert!(matches("   ", "Anything", None, &[]));
    }

    #[test]
    fn test_phrase_mode_requires_full_phrase() {
        let m = Matcher::new("Monetary  Policy", MatchMode::Phrase);
        assert!(m.matches_fields("Notes on monetary\npolicy rules", None, &[]));
        assert!(!m.matches_fields("Policy and monetary aggregates", None, &[]));
        assert!(!m.matches_fields("Monetary policymakers", None, &[]));
    }

    #[test]
    fn test_phrase_does_not_span_fields() {
        let m = Matcher::new("growth accounting", MatchMode::Phrase);
        assert!(!m.matches_fields("Growth", Some("Accounting for firms"), &[]));

        let separator_query = Matcher::new("growth | accounting", MatchMode::Phrase);
        assert!(!separator_query.matches_fields("Growth", Some("Accounting for firms"), &[]));
        assert!(!separator_query.matches_fields("Growth", None, &["Accounting".to_string()]));
        assert!(separator_query.matches_fields("Growth | accounting ledger", None, &[]));
    }

    #[test]
    fn test_all_tokens_may_come_from_different_fields() {
        let m = Matcher::new("growth accounting", MatchMode::AllTokens);
        assert!(m.matches_fields("Growth", None, &["Accounting".to_string()]));
        assert!(!Matcher::new("|", MatchMode::AllTokens).matches_fields("Growth", Some("Accounting"), &[]));
    }

    #[test]
    fn test_all_tokens_mode_matches_independently() {
        let m = Matcher::new("monetary policy", MatchMode::AllTokens);
        assert!(m.matches_fields("Policy and monetary aggregates", None, &[]));
        assert!(m.matches_fields("Policy", Some("A monetary model"), &[]));
        assert!(!m.matches_fields("Monetary aggregates", None, &[]));
        assert!(!m.matches_fields("Monetary policymakers", None, &[]));
    }

    #[test]
    fn test_is_match_on_paper() {
        let mut p = paper("w1", "Labor Markets");
        p.abstract_text = Some("Neural network forecasts of unemployment".to_string());
        assert!(Matcher::new("AI", MatchMode::Phrase).is_match(&p));
        assert!(!Matcher::new("trade", MatchMode::Phrase).is_match(&p));
    }

    #[test]
    fn test_contains_word_overlapping_candidates() {
        assert!(contains_word("xab ab", "ab"));
        assert!(contains_word("a-a-a", "a-a"));
        assert!(!contains_word("abab", "ab"));
    }
}
