//! NBER working-paper page parsing.
//!
//! Two kinds of page are parsed:
//!
//! - **Listing pages** (`/papers?page=N&perPage=M`): every anchor whose path is
//!   `/papers/w<digits>` is a paper link, kept in page order.
//! - **Detail pages** (`/papers/w<digits>`): metadata comes from the Highwire
//!   `citation_*` meta tags, the abstract from the page header intro.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::filters::dates::parse_date;
use crate::models::Paper;

static PAPER_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/papers/(w\d+)/?$").expect("valid paper path regex"));
static ABSTRACT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^abstract:?\s*").expect("valid prefix regex"));
static ABSTRACT_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\babstract\b:?\s*").expect("valid label regex"));
static ABSTRACT_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n\s*\r?\n|JEL|Keywords").expect("valid end regex"));

static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static TITLE_HEADING: Lazy<Selector> = Lazy::new(|| selector("h1"));
static MAIN_CONTENT: Lazy<Selector> = Lazy::new(|| selector("main"));
static BODY: Lazy<Selector> = Lazy::new(|| selector("body"));

/// Containers that hold the abstract, most specific first.
static ABSTRACT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "div.page-header__intro",
        "div.page-header__intro--centered",
        "div.abstract-content",
        "div.abstract",
        r#"div[class*="abstract"]"#,
        "p.abstract",
        "section.abstract",
    ]
    .into_iter()
    .map(selector)
    .collect()
});

const MIN_FALLBACK_ABSTRACT_CHARS: usize = 100;
const MAX_FALLBACK_ABSTRACT_CHARS: usize = 2000;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// A paper link found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperLink {
    pub paper_id: String,
    pub url: String,
}

/// Build the URL of listing page `page` (1-based).
pub fn listing_url(base_url: &str, page: usize, per_page: usize, query: &str) -> String {
    let mut url = format!(
        "{}/papers?page={page}&perPage={per_page}",
        base_url.trim_end_matches('/')
    );
    let query = query.trim();
    if !query.is_empty() {
        url.push_str("&q=");
        url.push_str(&urlencoding::encode(query));
    }
    url
}

/// Extract paper links from a listing page, in page order, without repeats.
pub fn parse_listing(html: &str, base: &Url) -> Vec<PaperLink> {
    let document = Html::parse_document(html);

    let links: Vec<PaperLink> = document
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .filter(|resolved| resolved.host_str() == base.host_str())
        .filter_map(|mut resolved| {
            let paper_id = PAPER_PATH.captures(resolved.path())?.get(1)?.as_str().to_string();
            resolved.set_query(None);
            resolved.set_fragment(None);
            Some(PaperLink {
                paper_id,
                url: resolved.to_string(),
            })
        })
        .unique_by(|link| link.paper_id.clone())
        .collect();

    debug!(count = links.len(), "Parsed listing page");
    links
}

/// Build a [`Paper`] from a detail page.
///
/// Title, authors, publication date and PDF link come from the `citation_*`
/// meta tags, with the first `<h1>` as a title fallback. A date that does not
/// parse is logged and left empty rather than failing the page.
///
/// # Arguments
///
/// * `html` - Body of the detail page
/// * `link` - The listing entry that led here; supplies the id and page URL
/// * `scraped_at` - Timestamp recorded on the paper
///
/// # Returns
///
/// The parsed paper, or [`ScrapeError::Parse`] when the page carries no title.
pub fn parse_paper(html: &str, link: &PaperLink, scraped_at: DateTime<Utc>) -> Result<Paper> {
    let document = Html::parse_document(html);

    let title = meta_content(&document, "citation_title")
        .or_else(|| {
            document
                .select(&TITLE_HEADING)
                .next()
                .map(|h| collapse_whitespace(&element_text(h)))
                .filter(|t| !t.is_empty())
        })
        .ok_or_else(|| ScrapeError::parse(&link.url, "no citation_title meta tag or heading"))?;

    let authors = meta_contents(&document, "citation_author");

    let date = meta_content(&document, "citation_publication_date").and_then(|raw| {
        parse_date(&raw)
            .inspect_err(|e| warn!(paper_id = %link.paper_id, error = %e, "Ignoring unparsable publication date"))
            .ok()
    });

    let pdf_url = meta_content(&document, "citation_pdf_url").map(|raw| {
        Url::parse(&link.url)
            .and_then(|page| page.join(&raw))
            .map(|u| u.to_string())
            .unwrap_or(raw)
    });

    let abstract_text = abstract_from_containers(&document).or_else(|| fallback_abstract(&document));

    Ok(Paper {
        paper_id: link.paper_id.clone(),
        title,
        authors,
        abstract_text,
        url: Some(link.url.clone()),
        pdf_url,
        date,
        scraped_at,
    })
}

fn meta_selector(name: &str) -> Selector {
    selector(&format!(r#"meta[name="{name}"]"#))
}

fn meta_contents(document: &Html, name: &str) -> Vec<String> {
    document
        .select(&meta_selector(name))
        .filter_map(|m| m.value().attr("content"))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn meta_content(document: &Html, name: &str) -> Option<String> {
    meta_contents(document, name).into_iter().next()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}

fn abstract_from_containers(document: &Html) -> Option<String> {
    ABSTRACT_SELECTORS.iter().find_map(|sel| {
        let element = document.select(sel).next()?;
        let text = collapse_whitespace(&element_text(element));
        let cleaned = ABSTRACT_PREFIX.replace(&text, "").trim().to_string();
        (!cleaned.is_empty()).then_some(cleaned)
    })
}

/// Look for an "Abstract:" paragraph in the page's main text.
fn fallback_abstract(document: &Html) -> Option<String> {
    let container = document
        .select(&MAIN_CONTENT)
        .next()
        .or_else(|| document.select(&BODY).next())?;
    let text = element_text(container);

    let label = ABSTRACT_LABEL.find(&text)?;
    let rest = &text[label.end()..];
    let min_end = rest
        .char_indices()
        .nth(MIN_FALLBACK_ABSTRACT_CHARS - 1)
        .map(|(i, c)| i + c.len_utf8())?;
    let end = ABSTRACT_END
        .find_at(rest, min_end)
        .map_or(rest.len(), |m| m.start());
    let candidate = rest[..end].trim();
    if candidate.chars().count() > MAX_FALLBACK_ABSTRACT_CHARS {
        return None;
    }
    Some(collapse_whitespace(candidate))
}
