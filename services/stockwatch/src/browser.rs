//! Headless-browser content source
//!
//! Renders the page in headless Chrome via chromiumoxide so script-driven
//! shop pages produce the same markup a real visitor sees. One browser is
//! launched per fetch and torn down afterwards; the fetch throttle keeps
//! the number of simultaneous renders bounded.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;

use crate::config::FetchConfig;
use crate::source::{ContentSnapshot, ContentSource};

/// How often the readiness selector is re-checked while waiting
const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct BrowserContentSource {
    wait_timeout: Duration,
}

impl BrowserContentSource {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            wait_timeout: Duration::from_secs(config.wait_timeout_seconds),
        }
    }
}

#[async_trait]
impl ContentSource for BrowserContentSource {
    async fn fetch(&self, url: &str, readiness_selector: &str) -> crate::Result<ContentSnapshot> {
        let browser_config = BrowserConfig::builder()
            .build()
            .map_err(crate::StockwatchError::Fetch)?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| crate::StockwatchError::Fetch(format!("Launching browser: {}", e)))?;

        // The handler stream must be driven for the browser connection to
        // make progress.
        let events = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let result = render_page(&browser, url, readiness_selector, self.wait_timeout).await;

        if let Err(e) = browser.close().await {
            tracing::debug!("Closing browser: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!("Waiting for browser exit: {}", e);
        }
        events.abort();

        result
    }
}

async fn render_page(
    browser: &Browser,
    url: &str,
    readiness_selector: &str,
    wait_timeout: Duration,
) -> crate::Result<ContentSnapshot> {
    let page = browser
        .new_page(url)
        .await
        .map_err(|e| crate::StockwatchError::Fetch(format!("Navigating to {}: {}", url, e)))?;

    if let Err(e) = page.wait_for_navigation().await {
        tracing::debug!("Navigation wait for {}: {}", url, e);
    }

    // Script-heavy pages keep mutating after the load event; poll until the
    // relevant markup exists or the wait budget runs out.
    let deadline = tokio::time::Instant::now() + wait_timeout;
    loop {
        match page.find_elements(readiness_selector).await {
            Ok(elements) if !elements.is_empty() => break,
            Ok(_) | Err(_) => {}
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(crate::StockwatchError::Fetch(format!(
                "Timed out waiting for '{}' at {}",
                readiness_selector, url
            )));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    let html = page
        .content()
        .await
        .map_err(|e| crate::StockwatchError::Fetch(format!("Reading page content: {}", e)))?;

    Ok(ContentSnapshot::new(html))
}
