//! Content source trait and page snapshot types

use async_trait::async_trait;

/// Rendered page markup from one fetch. Consumed by one evaluation and
/// discarded; nothing is retained across cycles.
#[derive(Debug, Clone)]
pub struct ContentSnapshot {
    html: String,
}

impl ContentSnapshot {
    pub fn new(html: String) -> Self {
        Self { html }
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Produces a page snapshot once at least one element matching the
/// readiness selector exists. Fails on navigation errors and on waits
/// that never see the selector appear.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, url: &str, readiness_selector: &str) -> crate::Result<ContentSnapshot>;
}
