//! Plain HTTP content source
//!
//! Fetches the page markup with a single GET. Suitable for shops that
//! render availability server-side; script-driven pages need the browser
//! source instead.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::FetchConfig;
use crate::io::HttpClient;
use crate::source::{ContentSnapshot, ContentSource};

pub struct HttpContentSource {
    http: Arc<dyn HttpClient>,
    user_agent: String,
}

impl std::fmt::Debug for HttpContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpContentSource")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl HttpContentSource {
    pub fn new(config: &FetchConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            user_agent: config.user_agent.clone(),
        }
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch(&self, url: &str, readiness_selector: &str) -> crate::Result<ContentSnapshot> {
        let response = self.http.get(url, &self.user_agent).await?;
        if !(200..300).contains(&response.status) {
            return Err(crate::StockwatchError::Fetch(format!(
                "GET {} returned status {}",
                url, response.status
            )));
        }

        // A static page either has the relevant markup or never will, so a
        // missing readiness selector is the wait-timeout analogue here.
        let selector = scraper::Selector::parse(readiness_selector).map_err(|e| {
            crate::StockwatchError::Fetch(format!(
                "invalid readiness selector '{}': {}",
                readiness_selector, e
            ))
        })?;
        let document = scraper::Html::parse_document(&response.body);
        if document.select(&selector).next().is_none() {
            return Err(crate::StockwatchError::Fetch(format!(
                "readiness selector '{}' not present at {}",
                readiness_selector, url
            )));
        }
        drop(document);

        Ok(ContentSnapshot::new(response.body))
    }
}
