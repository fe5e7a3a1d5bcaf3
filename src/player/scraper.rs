//! Player crawl driver
//!
//! Walks the paginated listing, harvests detail links from each page,
//! visits every player and assembles records via the pure extractors.

use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::Page;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser;
use crate::config::CrawlConfig;
use crate::error::ScrapeError;
use crate::export;
use crate::traits::Crawler;

use super::extract;
use super::types::{
    CrawlSummary, PageReport, PageStatus, PlayerRecord, SkipReason, SkippedPlayer,
};

/// Results table on a listing page.
const PLAYER_TABLE_SELECTOR: &str = "#player-table-body";
/// Tab that reveals the season-stats panel on a detail page.
const STATS_TAB_SELECTOR: &str = r#"[title="Stats"]"#;

/// Collects the player anchors out of the listing table's name cells.
/// A name cell without an anchor is counted instead of aborting the scan,
/// so the caller can treat it as a transient not-found condition.
const HARVEST_SCRIPT: &str = r#"
    (() => {
        const cells = Array.from(document.querySelectorAll('#player-table-body .text'));
        const hrefs = [];
        let missing = 0;
        for (const cell of cells) {
            const a = cell.querySelector('a');
            if (a) { hrefs.push(a.href); } else { missing += 1; }
        }
        return JSON.stringify({ missing: missing, hrefs: hrefs });
    })()
"#;

#[derive(Debug, Deserialize)]
struct HarvestPayload {
    missing: u32,
    hrefs: Vec<String>,
}

/// URL of listing page `page`. Page 0 is the base URL itself; later pages
/// replace any trailing "/<digits>" suffix with their own number.
pub fn page_url(base: &str, page: u32) -> String {
    if page == 0 {
        return base.to_string();
    }
    let trimmed = match base.rfind('/') {
        Some(idx)
            if idx + 1 < base.len()
                && base[idx + 1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            &base[..idx]
        }
        _ => base,
    };
    format!("{}/{}", trimmed, page)
}

/// Player listing crawler
pub struct PlayerScraper {
    config: CrawlConfig,
    browser: Option<Browser>,
}

impl PlayerScraper {
    pub fn new(config: CrawlConfig) -> Self {
        Self {
            config,
            browser: None,
        }
    }

    fn browser(&self) -> Result<&Browser, ScrapeError> {
        self.browser
            .as_ref()
            .ok_or_else(|| ScrapeError::BrowserInit("Browser not initialized".to_string()))
    }

    /// Scrape a single player detail page on a fresh browser tab.
    pub async fn scrape_one(&self, url: &str) -> Result<PlayerRecord, SkipReason> {
        let browser = self.browser()?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::BrowserInit(e.to_string()))?;

        let result = self.scrape_player(&page, url).await;
        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }
        result
    }

    /// Navigate to a listing page and wait for the results table and its
    /// anchors to exist.
    async fn open_listing(&self, page: &Page, url: &str) -> Result<(), ScrapeError> {
        browser::goto(page, url).await?;
        browser::wait_for_selector(page, PLAYER_TABLE_SELECTOR, self.config.wait_timeout).await?;
        browser::wait_for_selector(page, "a", self.config.wait_timeout).await?;
        Ok(())
    }

    /// Read the detail links out of the loaded listing, re-reading from
    /// scratch with a short backoff while anchors are still missing.
    async fn harvest_links(&self, page: &Page) -> Result<Vec<String>, ScrapeError> {
        let mut last_error = ScrapeError::ElementNotFound("player link anchors".to_string());

        for attempt in 0..self.config.harvest_retries {
            match browser::eval_json::<HarvestPayload>(page, HARVEST_SCRIPT).await {
                Ok(payload) if payload.missing == 0 => return Ok(payload.hrefs),
                Ok(payload) => {
                    debug!(
                        attempt,
                        missing = payload.missing,
                        "name cells without anchors, re-reading"
                    );
                    last_error = ScrapeError::ElementNotFound(format!(
                        "{} name cells without an anchor",
                        payload.missing
                    ));
                }
                Err(e) if e.is_retryable() => last_error = e,
                Err(e) => return Err(e),
            }
            if attempt + 1 < self.config.harvest_retries {
                sleep(self.config.retry_backoff).await;
            }
        }

        Err(last_error)
    }

    /// Load a listing page and harvest its links, with bounded same-page
    /// attempts. A page is only abandoned once every attempt has failed;
    /// the caller records the abandonment and moves on.
    async fn harvest_page(&self, page: &Page, url: &str) -> Result<Vec<String>, ScrapeError> {
        let mut last_error = ScrapeError::Navigation(format!("listing {} unreachable", url));

        for attempt in 0..self.config.page_attempts {
            match self.open_listing(page, url).await {
                Ok(()) => match self.harvest_links(page).await {
                    Ok(links) => return Ok(links),
                    Err(e) => last_error = e,
                },
                Err(e) => last_error = e,
            }
            if attempt + 1 < self.config.page_attempts {
                warn!(
                    "Listing attempt {}/{} failed, retrying: {}",
                    attempt + 1,
                    self.config.page_attempts,
                    last_error
                );
                sleep(self.config.retry_backoff).await;
            }
        }

        Err(last_error)
    }

    /// Visit one player detail page and assemble its record.
    async fn scrape_player(&self, page: &Page, url: &str) -> Result<PlayerRecord, SkipReason> {
        debug!("Visiting {}", url);
        browser::goto(page, url).await?;
        browser::wait_ready(page).await?;
        let profile_html = browser::page_html(page).await?;

        // Reveal the season-stats panel, then re-read the page
        let clicked = browser::click(page, STATS_TAB_SELECTOR).await?;
        let stats_html = if clicked {
            sleep(self.config.stats_wait).await;
            Some(browser::page_html(page).await?)
        } else {
            None
        };

        extract::build_record(&profile_html, stats_html.as_deref(), &self.config.season)
    }

    /// Process one listing page end to end. Failures are captured in the
    /// report; they never abort the crawl.
    async fn crawl_page(&self, page: &Page, page_no: u32, url: &str) -> PageReport {
        info!("Page {}: {}", page_no, url);

        let links = match self.harvest_page(page, url).await {
            Ok(links) => links,
            Err(e) => {
                warn!("Page {} abandoned: {}", page_no, e);
                return PageReport::failed(page_no, url, &e);
            }
        };

        if links.is_empty() {
            info!("Page {} listed no players", page_no);
            return PageReport {
                page: page_no,
                url: url.to_string(),
                status: PageStatus::Empty,
                records: Vec::new(),
                skipped: Vec::new(),
            };
        }

        let mut records = Vec::new();
        let mut skipped = Vec::new();
        for link in links {
            match self.scrape_player(page, &link).await {
                Ok(record) => {
                    info!("Recorded {} ({})", record.name, record.team);
                    records.push(record);
                }
                Err(reason) => {
                    warn!("Skipping {}: {}", link, reason);
                    if self.config.debug {
                        browser::debug_screenshot(page, &link).await;
                    }
                    skipped.push(SkippedPlayer { url: link, reason });
                }
            }
        }

        PageReport {
            page: page_no,
            url: url.to_string(),
            status: PageStatus::Harvested,
            records,
            skipped,
        }
    }
}

#[async_trait]
impl Crawler for PlayerScraper {
    async fn initialize(&mut self) -> Result<(), ScrapeError> {
        self.browser = Some(browser::launch(&self.config).await?);
        Ok(())
    }

    async fn crawl(&mut self) -> Result<CrawlSummary, ScrapeError> {
        let browser = self.browser()?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::BrowserInit(e.to_string()))?;

        let mut summary = CrawlSummary::default();
        // The cursor advances exactly once per page, success or failure.
        for page_no in 0..self.config.max_pages {
            let url = page_url(&self.config.start_url, page_no);
            let report = self.crawl_page(&page, page_no, &url).await;
            info!(
                "Page {} done: {} recorded, {} skipped",
                page_no,
                report.records.len(),
                report.skipped.len()
            );
            summary.reports.push(report);
        }

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }

        info!(
            "Crawl finished: {} records, {} skipped, {} failed pages, {} empty pages",
            summary.record_count(),
            summary.skipped_count(),
            summary.failed_pages(),
            summary.empty_pages()
        );
        Ok(summary)
    }

    async fn export(&mut self, summary: &CrawlSummary) -> Result<PathBuf, ScrapeError> {
        let path = export::write_csv(&self.config.output_path, summary.records())?;
        info!("Exported {} records to {:?}", summary.record_count(), path);

        if self.config.debug {
            export::dump_debug_json(&self.config.output_path, summary.records());
        }

        Ok(path)
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        self.browser = None;
        Ok(())
    }
}
