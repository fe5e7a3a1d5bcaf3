use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("browser init error: {0}")]
    BrowserInit(String),

    #[error("navigation error: {0}")]
    Navigation(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("stale element: {0}")]
    StaleElement(String),

    #[error("javascript error: {0}")]
    JavaScript(String),

    #[error("json error: {0}")]
    Json(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("file error: {0}")]
    FileIo(#[from] std::io::Error),
}

impl ScrapeError {
    /// Transient element conditions worth re-reading the page for.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScrapeError::StaleElement(_) | ScrapeError::ElementNotFound(_)
        )
    }
}
