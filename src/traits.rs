use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::ScrapeError;
use crate::player::{CrawlOutcome, CrawlSummary};

#[async_trait]
pub trait Crawler: Send + Sync {
    /// Browser startup
    async fn initialize(&mut self) -> Result<(), ScrapeError>;

    /// Visit every listing page and collect player records
    async fn crawl(&mut self) -> Result<CrawlSummary, ScrapeError>;

    /// Write the collected records to CSV
    async fn export(&mut self, summary: &CrawlSummary) -> Result<PathBuf, ScrapeError>;

    /// Release browser resources
    async fn close(&mut self) -> Result<(), ScrapeError>;

    /// One-shot run (initialize → crawl → export → close)
    async fn execute(&mut self) -> Result<CrawlOutcome, ScrapeError> {
        self.initialize().await?;
        let summary = self.crawl().await?;
        let csv_path = self.export(&summary).await?;
        self.close().await?;
        Ok(CrawlOutcome { csv_path, summary })
    }
}
