use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Base listing URL; page n is reached by appending "/n".
    pub start_url: String,
    /// Page cursor ceiling (pages 0..max_pages are visited).
    pub max_pages: u32,
    /// Season label a stats row must carry to be kept.
    pub season: String,
    /// Destination of the CSV export.
    pub output_path: PathBuf,
    /// Link-harvest attempts per page before giving up.
    pub harvest_retries: u32,
    /// Full navigation attempts per listing page before it is abandoned.
    pub page_attempts: u32,
    /// Sleep between harvest retries.
    pub retry_backoff: Duration,
    /// Bounded wait for the results table / anchors to appear.
    pub wait_timeout: Duration,
    /// Pause after clicking the stats tab before re-reading the page.
    pub stats_wait: Duration,
    pub headless: bool,
    pub debug: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_url: "https://www.footballtransfers.com/en/players".to_string(),
            max_pages: 4500,
            season: "2022/2023".to_string(),
            output_path: PathBuf::from("player_data.csv"),
            harvest_retries: 5,
            page_attempts: 3,
            retry_backoff: Duration::from_millis(500),
            wait_timeout: Duration::from_secs(10),
            stats_wait: Duration::from_millis(500),
            headless: true,
            debug: false,
        }
    }
}

impl CrawlConfig {
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_season(mut self, season: impl Into<String>) -> Self {
        self.season = season.into();
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_harvest_retries(mut self, retries: u32) -> Self {
        self.harvest_retries = retries;
        self
    }

    pub fn with_page_attempts(mut self, attempts: u32) -> Self {
        self.page_attempts = attempts;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
