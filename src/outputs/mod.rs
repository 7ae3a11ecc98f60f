//! Output generation for scrape results and analysis reports.
//!
//! # Submodules
//!
//! - [`json`]: writes and reads the paper collection as a JSON array
//! - [`report`]: renders an analysis as terminal text or Markdown
//!
//! # Output Structure
//!
//! ```text
//! data/
//! └── nber_ai_papers.json        # scrape
//! downloads/
//! └── w32000.pdf                 # scrape --download-pdfs
//! analysis/
//! ├── analysis_report.md         # analyze --output-dir analysis
//! └── analysis_summary.json
//! ```

pub mod json;
pub mod report;
