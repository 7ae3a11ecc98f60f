//! Data model for scraped working papers.
//!
//! The crate has a single entity, [`Paper`]. A record is built once by the
//! parser from a detail page, stamped with `scraped_at`, and then either kept
//! or discarded by the filters. Nothing mutates a record after it is built.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one NBER working paper.
///
/// # JSON Schema
///
/// Serialized keys, in order: `paper_id`, `title`, `authors`, `abstract`,
/// `url`, `pdf_url`, `date`, `scraped_at`. Optional fields are written as
/// `null` rather than omitted so every object has the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Paper {
    /// Site-assigned identifier such as `w32000`.
    pub paper_id: String,
    /// The paper title.
    pub title: String,
    /// Author display names in page order.
    #[serde(default)]
    pub authors: Vec<String>,
    /// Abstract text, whitespace-normalized.
    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<String>,
    /// Detail page URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Direct PDF link, when the page lists one.
    #[serde(default)]
    pub pdf_url: Option<String>,
    /// Publication date, `YYYY-MM-DD` on the wire.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// When the record was extracted.
    pub scraped_at: DateTime<Utc>,
}

impl Paper {
    /// Whether the paper lists a PDF link.
    pub fn has_pdf(&self) -> bool {
        self.pdf_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    /// Whether the paper has a non-empty abstract.
    pub fn has_abstract(&self) -> bool {
        self.abstract_text
            .as_deref()
            .is_some_and(|a| !a.trim().is_empty())
    }

    /// File name used when the PDF is downloaded.
    pub fn pdf_file_name(&self) -> String {
        format!("{}.pdf", self.paper_id)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn paper(id: &str, title: &str) -> Paper {
        Paper {
            paper_id: id.to_string(),
            title: title.to_string(),
            authors: Vec::new(),
            abstract_text: None,
            url: Some(format!("https://www.nber.org/papers/{id}")),
            pdf_url: None,
            date: None,
            scraped_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::paper;
    use super::*;

    #[test]
    fn test_paper_serialization_keys() {
        let mut p = paper("w32000", "AI and Growth");
        p.authors = vec!["Jane Doe".to_string()];
        p.date = NaiveDate::from_ymd_opt(2024, 1, 15);

        let value = serde_json::to_value(&p).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for key in [
            "paper_id",
            "title",
            "authors",
            "abstract",
            "url",
            "pdf_url",
            "date",
            "scraped_at",
        ] {
            assert!(keys.contains(&key), "missing key {key}");
        }
        assert_eq!(keys.len(), 8);
        assert_eq!(value["date"], "2024-01-15");
        assert!(value["abstract"].is_null());
    }

    #[test]
    fn test_paper_deserialization() {
        let json = r#"{
            "paper_id": "w1",
            "title": "Labor Markets",
            "authors": ["A", "B"],
            "abstract": "We study labor.",
            "url": null,
            "pdf_url": "https://www.nber.org/system/files/working_papers/w1/w1.pdf",
            "date": null,
            "scraped_at": "2024-05-01T12:00:00Z"
        }"#;
        let p: Paper = serde_json::from_str(json).unwrap();
        assert_eq!(p.authors.len(), 2);
        assert!(p.has_abstract());
        assert!(p.has_pdf());
        assert!(p.date.is_none());
        assert_eq!(p.pdf_file_name(), "w1.pdf");
    }

    #[test]
    fn test_blank_pdf_url_is_not_a_pdf() {
        let mut p = paper("w2", "Title");
        p.pdf_url = Some("  ".to_string());
        assert!(!p.has_pdf());
    }
}
