//! Player crawling module
//!
//! Listing pagination, per-page link harvesting, detail-page field and
//! season-stats extraction.

mod extract;
mod scraper;
mod types;

pub use extract::build_record;
pub use scraper::{page_url, PlayerScraper};
pub use types::{
    CrawlOutcome, CrawlSummary, PageReport, PageStatus, PlayerRecord, SkipReason, SkippedPlayer,
    FIELD_NAMES,
};
