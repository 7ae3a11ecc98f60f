//! Publication date parsing and range filtering.
//!
//! NBER pages publish dates as `YYYY/MM/DD`; users tend to type `YYYY-MM-DD`.
//! Both forms parse to the same [`NaiveDate`].

use chrono::NaiveDate;

use crate::error::{Result, ScrapeError};

const DATE_FORMATS: [&str; 2] = ["%Y/%m/%d", "%Y-%m-%d"];

/// Parse a `YYYY/MM/DD` or `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| ScrapeError::date(input))
}

/// Inclusive date bounds; an absent bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Build a range from user-supplied bound strings.
    ///
    /// Blank strings count as absent. Fails on a malformed bound or when the
    /// start falls after the end.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let parse_bound = |bound: Option<&str>| {
            bound
                .filter(|s| !s.trim().is_empty())
                .map(parse_date)
                .transpose()
        };
        let range = Self {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        };
        if let (Some(s), Some(e)) = (range.start, range.end) {
            if s > e {
                return Err(ScrapeError::config(format!(
                    "start date {s} is after end date {e}"
                )));
            }
        }
        Ok(range)
    }

    /// Whether any bound is set.
    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Papers without a known date are always included.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        let Some(date) = date else {
            return true;
        };
        self.start.is_none_or(|s| s <= date) && self.end.is_none_or(|e| date <= e)
    }
}

/// String form of the filter: parse all three inputs, then check the range.
pub fn in_range(paper_date: Option<&str>, start: Option<&str>, end: Option<&str>) -> Result<bool> {
    let range = DateRange::parse(start, end)?;
    if !range.is_active() {
        return Ok(true);
    }
    let date = paper_date.map(parse_date).transpose()?;
    Ok(range.contains(date))
}
