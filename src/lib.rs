//! Player listing crawler
//!
//! - Walks a paginated player-listing site, harvesting detail links
//! - Extracts profile attributes and one season of match statistics
//! - Exports the records to a CSV file
//!
//! # One-shot crawl
//!
//! ```rust,ignore
//! use transfer_scraper::{CrawlConfig, Crawler, PlayerScraper};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = CrawlConfig::new("https://www.footballtransfers.com/en/players")
//!         .with_max_pages(5)
//!         .with_output_path("player_data.csv");
//!
//!     let mut scraper = PlayerScraper::new(config);
//!     let outcome = scraper.execute().await.unwrap();
//!     println!("{} records -> {:?}", outcome.summary.record_count(), outcome.csv_path);
//! }
//! ```
//!
//! # As a tower service
//!
//! ```rust,ignore
//! use transfer_scraper::{CrawlRequest, ScraperService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = ScraperService::new();
//!
//!     let request = CrawlRequest::new("https://www.footballtransfers.com/en/players")
//!         .with_max_pages(2)
//!         .with_headless(true);
//!
//!     let result = service.call(request).await.unwrap();
//!     println!("CSV written: {:?}", result.csv_path);
//! }
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod export;
pub mod player;
pub mod service;
pub mod traits;

// Re-export the main types
pub use config::CrawlConfig;
pub use error::ScrapeError;
pub use player::{
    CrawlOutcome, CrawlSummary, PageReport, PageStatus, PlayerRecord, PlayerScraper, SkipReason,
};
pub use service::{CrawlRequest, CrawlResult, ScraperService};
pub use traits::Crawler;
