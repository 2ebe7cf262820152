//! Webhook notification dispatch

use std::sync::Arc;

use serde::Serialize;

use crate::config::TargetConfig;
use crate::io::HttpClient;

/// Title used when the target does not override it
const DEFAULT_PAYLOAD_TITLE: &str = "Stock available";

/// JSON body POSTed to the webhook endpoint, resolved once per target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    pub url: String,
    pub title: String,
    pub message: String,
}

impl NotificationPayload {
    /// Resolve payload fields, falling back to target-derived values for
    /// any override left blank: the monitored URL, the default title, and
    /// the target name as message.
    pub fn from_config(config: &TargetConfig) -> Self {
        let webhook = &config.webhook;
        Self {
            url: non_empty_or(&webhook.payload_url, &config.url),
            title: non_empty_or(&webhook.payload_title, DEFAULT_PAYLOAD_TITLE),
            message: non_empty_or(&webhook.payload_body, &config.name),
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Sends the precomputed payload to a target's webhook endpoint, best
/// effort: one POST, no retry, a failed delivery is logged and lost.
pub struct WebhookNotifier {
    target_name: String,
    url: String,
    bearer_token: String,
    payload: NotificationPayload,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("target_name", &self.target_name)
            .field("url", &self.url)
            .finish()
    }
}

impl WebhookNotifier {
    pub fn new(config: &TargetConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            target_name: config.name.clone(),
            url: config.webhook.url.clone(),
            bearer_token: config.webhook.bearer_token.clone(),
            payload: NotificationPayload::from_config(config),
            http,
        }
    }

    pub fn payload(&self) -> &NotificationPayload {
        &self.payload
    }

    pub async fn notify(&self) -> crate::Result<()> {
        if self.url.is_empty() {
            tracing::info!(
                "[{}] No webhook configured, skipping notification",
                self.target_name
            );
            return Ok(());
        }

        let body = serde_json::to_value(&self.payload)?;
        match self.http.post_json(&self.url, &body, &self.bearer_token).await {
            Ok(response) if (200..300).contains(&response.status) => {
                tracing::info!(
                    "[{}] Webhook delivered ({})",
                    self.target_name,
                    response.status
                );
                Ok(())
            }
            Ok(response) => {
                let err = crate::StockwatchError::Notify(format!(
                    "webhook returned status {}: {}",
                    response.status, response.body
                ));
                tracing::warn!("[{}] {}", self.target_name, err);
                Err(err)
            }
            Err(e) => {
                let err = crate::StockwatchError::Notify(format!("webhook send failed: {}", e));
                tracing::warn!("[{}] {}", self.target_name, err);
                Err(err)
            }
        }
    }
}
