//! Inclusion filters applied to every parsed paper.
//!
//! - [`matcher`]: whole-word keyword matching with synonym expansion
//! - [`dates`]: publication date parsing and range checks
//!
//! Both filters are pure; the crawler keeps a paper only when both pass.

pub mod dates;
pub mod matcher;

pub use dates::DateRange;
pub use matcher::{MatchMode, Matcher};
