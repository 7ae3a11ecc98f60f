//! Site scrapers.
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | NBER working papers | [`nber`] | HTML scraping of listing and detail pages |
//!
//! A scraper module exports:
//! - `listing_url(...)`: the URL of one listing page
//! - `parse_listing(html, base)`: ordered paper links on that page
//! - `parse_paper(html, link, scraped_at)`: one [`Paper`](crate::models::Paper)
//!
//! Scrapers only parse; fetching and pacing belong to the crawler.

pub mod nber;
