use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::config::CrawlConfig;
use crate::error::ScrapeError;
use crate::player::{CrawlOutcome, PlayerScraper};
use crate::traits::Crawler;

/// Crawl request
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub start_url: String,
    pub max_pages: u32,
    pub output_path: PathBuf,
    pub headless: bool,
}

impl CrawlRequest {
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            max_pages: CrawlConfig::default().max_pages,
            output_path: PathBuf::from("player_data.csv"),
            headless: true,
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

impl From<CrawlRequest> for CrawlConfig {
    fn from(req: CrawlRequest) -> Self {
        CrawlConfig::new(req.start_url)
            .with_max_pages(req.max_pages)
            .with_output_path(req.output_path)
            .with_headless(req.headless)
    }
}

/// Crawl result
#[derive(Debug)]
pub struct CrawlResult {
    pub csv_path: PathBuf,
    pub csv_content: Vec<u8>,
    pub record_count: usize,
}

impl CrawlResult {
    pub fn new(outcome: CrawlOutcome) -> std::io::Result<Self> {
        let csv_content = std::fs::read(&outcome.csv_path)?;
        Ok(Self {
            csv_path: outcome.csv_path,
            csv_content,
            record_count: outcome.summary.record_count(),
        })
    }
}

/// Crawler front implementing tower::Service
#[derive(Debug, Clone, Default)]
pub struct ScraperService {
    // Room for future extension (rate limiting, caching, ...)
}

impl ScraperService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<CrawlRequest> for ScraperService {
    type Response = CrawlResult;
    type Error = ScrapeError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: CrawlRequest) -> Self::Future {
        info!("Crawl request received: start_url={}", req.start_url);

        Box::pin(async move {
            let config: CrawlConfig = req.into();
            let mut scraper = PlayerScraper::new(config);

            let outcome = scraper.execute().await?;
            let result = CrawlResult::new(outcome)?;

            info!(
                "Crawl complete: path={:?}, records={}, size={}bytes",
                result.csv_path,
                result.record_count,
                result.csv_content.len()
            );

            Ok(result)
        })
    }
}
