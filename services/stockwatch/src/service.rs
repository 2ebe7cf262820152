//! Monitor set: builds every target monitor and drives their shared lifecycle

use std::sync::Arc;

use crate::browser::BrowserContentSource;
use crate::config::{Config, FetchConfig, SourceKind};
use crate::http_source::HttpContentSource;
use crate::io::HttpClient;
use crate::monitor::TargetMonitor;
use crate::notifier::WebhookNotifier;
use crate::source::ContentSource;
use crate::throttle::FetchThrottle;

/// Pick the content source implementation for the configured fetch engine
pub fn build_source(config: &FetchConfig, http: Arc<dyn HttpClient>) -> Arc<dyn ContentSource> {
    match config.source {
        SourceKind::Http => Arc::new(HttpContentSource::new(config, http)),
        SourceKind::Browser => Arc::new(BrowserContentSource::new(config)),
    }
}

/// Holds all target monitors
#[derive(Debug)]
pub struct MonitorSet {
    monitors: Vec<TargetMonitor>,
}

impl MonitorSet {
    /// Build one monitor per configured target, all sharing the content
    /// source and the fetch throttle. A target that fails validation is
    /// logged and skipped; it never keeps the others from starting.
    pub fn from_config(
        config: &Config,
        source: Arc<dyn ContentSource>,
        http: Arc<dyn HttpClient>,
    ) -> crate::Result<Self> {
        if config.fetch.max_concurrent_fetches == 0 {
            return Err(crate::StockwatchError::Config(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        let throttle = FetchThrottle::new(config.fetch.max_concurrent_fetches);

        let mut monitors = Vec::new();
        for target in &config.targets {
            let notifier = Arc::new(WebhookNotifier::new(target, Arc::clone(&http)));
            match TargetMonitor::new(target, Arc::clone(&source), throttle.clone(), notifier) {
                Ok(monitor) => {
                    for line in target.describe() {
                        tracing::info!("{}", line);
                    }
                    monitors.push(monitor);
                }
                Err(e) => {
                    tracing::error!("Skipping invalid target: {}", e);
                }
            }
        }

        Ok(Self { monitors })
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    pub fn start_all(&mut self) {
        for monitor in &mut self.monitors {
            monitor.start();
        }
    }

    /// Stop every monitor, waiting until each polling task has exited.
    /// Hosts must let this complete before the process exits so no fetch
    /// is abandoned mid-flight.
    pub async fn stop_all(&mut self) {
        for monitor in &mut self.monitors {
            monitor.stop().await;
        }
    }
}
