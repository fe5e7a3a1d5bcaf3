//! Browser driver plumbing
//!
//! The crawl core touches Chromium only through the helpers here:
//! load a URL and block until ready, query elements and read their
//! text/attributes (via JS evaluation), and simulate a click.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::CrawlConfig;
use crate::error::ScrapeError;

/// Polling interval for bounded element waits.
const WAIT_CHECK_INTERVAL_MS: u64 = 500;
/// Ceiling for the document-ready poll on detail pages.
const READY_TIMEOUT_SECS: u64 = 30;

/// Launch Chromium and drain its event handler on a background task.
pub async fn launch(config: &CrawlConfig) -> Result<Browser, ScrapeError> {
    info!("Initializing browser...");

    // Unique user data dir so parallel runs do not trample each other
    let unique_id = format!(
        "{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    );
    let user_data_dir = std::env::temp_dir().join(format!("transfer-scraper-{}", unique_id));

    let chrome_path = std::env::var("CHROME_PATH")
        .or_else(|_| std::env::var("CHROMIUM_PATH"))
        .unwrap_or_else(|_| "chromium".to_string());

    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .user_data_dir(&user_data_dir);

    if !config.headless {
        builder = builder.with_head();
    }

    builder = builder
        .no_sandbox()
        .request_timeout(Duration::from_secs(60))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-gpu");

    if config.debug {
        builder = builder.arg("--enable-logging=stderr").arg("--v=1");
    }

    let browser_config = builder
        .build()
        .map_err(|e| ScrapeError::BrowserInit(e.to_string()))?;

    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| ScrapeError::BrowserInit(e.to_string()))?;

    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            debug!("Browser event: {:?}", event);
        }
    });

    info!("Browser initialized successfully");
    Ok(browser)
}

pub async fn goto(page: &Page, url: &str) -> Result<(), ScrapeError> {
    page.goto(url)
        .await
        .map_err(|e| ScrapeError::Navigation(e.to_string()))?;
    Ok(())
}

/// Evaluate a script that resolves to a boolean.
pub async fn eval_bool(page: &Page, script: &str) -> Result<bool, ScrapeError> {
    let result = page
        .evaluate(script)
        .await
        .map_err(|e| ScrapeError::JavaScript(e.to_string()))?;
    Ok(result.into_value::<bool>().unwrap_or(false))
}

/// Evaluate a script that resolves to a string.
pub async fn eval_string(page: &Page, script: &str) -> Result<String, ScrapeError> {
    let result = page
        .evaluate(script)
        .await
        .map_err(|e| ScrapeError::JavaScript(e.to_string()))?;
    Ok(result.into_value::<String>().unwrap_or_default())
}

/// Evaluate a script that resolves to a JSON string, then parse it.
pub async fn eval_json<T: DeserializeOwned>(page: &Page, script: &str) -> Result<T, ScrapeError> {
    let json = eval_string(page, script).await?;
    serde_json::from_str(&json).map_err(|e| ScrapeError::Json(e.to_string()))
}

/// Block until `selector` exists in the document, up to `timeout`.
pub async fn wait_for_selector(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> Result<(), ScrapeError> {
    let script = format!("document.querySelector('{selector}') !== null");
    let start = std::time::Instant::now();

    loop {
        if eval_bool(page, &script).await? {
            debug!(selector, elapsed = ?start.elapsed(), "selector present");
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(ScrapeError::Timeout(format!(
                "{} did not appear within {:?}",
                selector, timeout
            )));
        }
        sleep(Duration::from_millis(WAIT_CHECK_INTERVAL_MS)).await;
    }
}

/// Wait for the document to finish loading (readyState poll).
pub async fn wait_ready(page: &Page) -> Result<(), ScrapeError> {
    for i in 0..READY_TIMEOUT_SECS {
        let state = eval_string(page, "document.readyState").await?;
        if state == "complete" {
            return Ok(());
        }
        if i % 5 == 0 {
            debug!("Waiting for page load... ({}/{}) state={}", i + 1, READY_TIMEOUT_SECS, state);
        }
        sleep(Duration::from_secs(1)).await;
    }
    warn!("Page never reached readyState=complete, proceeding anyway");
    Ok(())
}

/// Simulate a click on the first element matching `selector`.
/// Returns false when no such element exists.
pub async fn click(page: &Page, selector: &str) -> Result<bool, ScrapeError> {
    let script = format!(
        r#"
        (() => {{
            const el = document.querySelector('{selector}');
            if (!el) return false;
            el.click();
            return true;
        }})()
        "#
    );
    eval_bool(page, &script).await
}

/// Full serialized document, for handing off to the HTML parser.
pub async fn page_html(page: &Page) -> Result<String, ScrapeError> {
    eval_string(page, "document.documentElement.outerHTML").await
}

/// Dump a base64 screenshot of the current page into the debug log.
pub async fn debug_screenshot(page: &Page, label: &str) {
    match page
        .screenshot(ScreenshotParams::builder().full_page(true).build())
        .await
    {
        Ok(screenshot) => {
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&screenshot);
            debug!("{} screenshot: data:image/png;base64,{}", label, encoded);
        }
        Err(e) => debug!("Failed to capture screenshot for {}: {}", label, e),
    }
}
