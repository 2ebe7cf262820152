//! Configuration types for the stockwatch service

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// How matching elements are located in a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    ClassGroup,
    IdGroup,
}

/// Whether finding the check string inside a matched element means
/// the product is available, or the other way around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckPolarity {
    PresenceMeansAvailable,
    AbsenceMeansAvailable,
}

/// One monitored shop page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    pub url: String,
    pub match_mode: MatchMode,
    #[serde(default)]
    pub class_candidates: Vec<String>,
    #[serde(default)]
    pub id_groups: Vec<Vec<String>>,
    pub check_string: String,
    #[serde(default = "default_check_polarity")]
    pub check_polarity: CheckPolarity,
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u64,
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Webhook endpoint and payload overrides for one target.
/// Empty payload fields fall back to target-derived values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub bearer_token: String,
    #[serde(default)]
    pub payload_title: String,
    #[serde(default)]
    pub payload_body: String,
    #[serde(default)]
    pub payload_url: String,
}

/// Which engine produces page snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Http,
    Browser,
}

/// Fetch settings shared by all targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_source_kind")]
    pub source: SourceKind,
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    #[serde(default = "default_wait_timeout_seconds")]
    pub wait_timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            source: default_source_kind(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            wait_timeout_seconds: default_wait_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

impl TargetConfig {
    /// Check matcher and webhook configuration. Problems found here keep
    /// the target from ever starting; nothing is re-checked at poll time.
    pub fn validate(&self) -> crate::Result<()> {
        match self.match_mode {
            MatchMode::ClassGroup => {
                if self.class_candidates.is_empty() {
                    return Err(config_error(
                        &self.name,
                        "match_mode is class_group but class_candidates is empty",
                    ));
                }
                if !self.id_groups.is_empty() {
                    return Err(config_error(
                        &self.name,
                        "match_mode is class_group but id_groups is also set",
                    ));
                }
            }
            MatchMode::IdGroup => {
                if self.id_groups.is_empty() {
                    return Err(config_error(
                        &self.name,
                        "match_mode is id_group but id_groups is empty",
                    ));
                }
                if self.id_groups.iter().any(|group| group.is_empty()) {
                    return Err(config_error(&self.name, "id_groups contains an empty group"));
                }
                if !self.class_candidates.is_empty() {
                    return Err(config_error(
                        &self.name,
                        "match_mode is id_group but class_candidates is also set",
                    ));
                }
            }
        }

        if self.check_string.is_empty() {
            return Err(config_error(&self.name, "check_string is empty"));
        }

        if !self.webhook.url.is_empty() && reqwest::Url::parse(&self.webhook.url).is_err() {
            return Err(config_error(
                &self.name,
                &format!("webhook url '{}' is not a valid URL", self.webhook.url),
            ));
        }

        Ok(())
    }

    /// Render the full target configuration, one field per line, for the
    /// startup log. The bearer token is redacted by name.
    pub fn describe(&self) -> Vec<String> {
        let id_groups = self
            .id_groups
            .iter()
            .map(|group| format!("[{}]", group.join(",")))
            .collect::<Vec<_>>()
            .join(",");
        let token = if self.webhook.bearer_token.is_empty() {
            "(not set)"
        } else {
            "(redacted)"
        };

        vec![
            format!("{:<16}: {}", "name", self.name),
            format!("{:<16}: {}", "url", self.url),
            format!("{:<16}: {:?}", "match_mode", self.match_mode),
            format!("{:<16}: [{}]", "class_candidates", self.class_candidates.join(",")),
            format!("{:<16}: [{}]", "id_groups", id_groups),
            format!("{:<16}: {}", "check_string", self.check_string),
            format!("{:<16}: {:?}", "check_polarity", self.check_polarity),
            format!("{:<16}: {}s", "refresh", self.refresh_seconds),
            format!("{:<16}: {}s", "cooldown", self.cooldown_seconds),
            format!("{:<16}: {}", "webhook_url", self.webhook.url),
            format!("{:<16}: {}", "bearer_token", token),
            format!("{:<16}: {}", "payload_title", self.webhook.payload_title),
            format!("{:<16}: {}", "payload_body", self.webhook.payload_body),
            format!("{:<16}: {}", "payload_url", self.webhook.payload_url),
        ]
    }
}

fn config_error(target: &str, message: &str) -> crate::StockwatchError {
    crate::StockwatchError::Config(format!("target '{}': {}", target, message))
}

fn default_check_polarity() -> CheckPolarity {
    CheckPolarity::AbsenceMeansAvailable
}

fn default_refresh_seconds() -> u64 {
    30
}

fn default_cooldown_seconds() -> u64 {
    600
}

fn default_source_kind() -> SourceKind {
    SourceKind::Browser
}

fn default_max_concurrent_fetches() -> usize {
    1
}

fn default_wait_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; Rigor/1.0.0; http://rigor.com)".to_string()
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::StockwatchError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
