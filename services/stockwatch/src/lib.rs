//! Stockwatch - shop stock availability monitoring and notification service
//!
//! Polls product pages, detects availability from the rendered markup, and
//! fires webhook notifications when a target comes back in stock.

pub mod browser;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod http_source;
pub mod io;
pub mod monitor;
pub mod notifier;
pub mod selector;
pub mod service;
pub mod source;
pub mod throttle;

pub use config::{load_config, Config};
pub use error::{Result, StockwatchError};

use std::sync::Arc;

use crate::io::ReqwestHttpClient;
use crate::service::MonitorSet;

/// Run the stockwatch service with the given configuration.
/// Returns after a shutdown signal once every monitor has stopped.
pub async fn run(config: Config) -> Result<()> {
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::default());
    let source = service::build_source(&config.fetch, Arc::clone(&http));

    let mut monitors = MonitorSet::from_config(&config, source, http)?;
    if monitors.is_empty() {
        return Err(StockwatchError::Config(
            "No valid targets configured".to_string(),
        ));
    }

    monitors.start_all();
    tracing::info!("{} monitor(s) started", monitors.len());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    monitors.stop_all().await;
    tracing::info!("All monitors stopped");

    Ok(())
}
