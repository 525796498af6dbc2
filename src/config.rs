//! Configuration module for feedbeat.

use serde::Deserialize;
use std::path::Path;

use crate::{FeedbeatError, Result};

/// Heartbeat scheduler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatConfig {
    /// Polling interval in minutes. Zero falls back to the default.
    #[serde(default = "default_interval_mins")]
    pub interval_mins: u64,
}

fn default_interval_mins() -> u64 {
    15
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_mins: default_interval_mins(),
        }
    }
}

impl HeartbeatConfig {
    /// Effective interval in minutes. An invalid (zero) value falls back
    /// to the default instead of stalling the loop.
    pub fn effective_interval_mins(&self) -> u64 {
        if self.interval_mins == 0 {
            default_interval_mins()
        } else {
            self.interval_mins
        }
    }
}

/// Notification rendering configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Include the feed title line.
    #[serde(default = "default_true")]
    pub show_feed_title: bool,
    /// Render feed and entry titles as markdown headings.
    #[serde(default = "default_true")]
    pub heading_titles: bool,
    /// Include the entry title line.
    #[serde(default = "default_true")]
    pub show_entry_title: bool,
    /// Include the entry's primary link.
    #[serde(default = "default_true")]
    pub show_link: bool,
    /// Include the entry body (content preferred over summary).
    #[serde(default = "default_true")]
    pub show_body: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_feed_title: true,
            heading_titles: true,
            show_entry_title: true,
            show_link: true,
            show_body: true,
        }
    }
}

/// Feed fetcher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
            max_feed_size_bytes: default_max_feed_size(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/feedbeat.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Notification sink configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// Webhook endpoint that receives rendered notifications.
    #[serde(default)]
    pub webhook_url: String,
    /// Opaque post-kind tag distinguishing bot posts from ordinary messages.
    #[serde(default = "default_post_kind")]
    pub post_kind: String,
}

fn default_post_kind() -> String {
    "custom_rssfeed".to_string()
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            post_kind: default_post_kind(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/feedbeat.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Heartbeat scheduler configuration.
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
    /// Notification rendering configuration.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Feed fetcher configuration.
    #[serde(default)]
    pub fetcher: FetcherConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Notification sink configuration.
    #[serde(default)]
    pub sink: SinkConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FeedbeatError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FeedbeatError::Config(format!("config parse error: {e}")))
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the notification sink has no endpoint.
    pub fn validate(&self) -> Result<()> {
        if self.sink.webhook_url.is_empty() {
            return Err(FeedbeatError::Config(
                "sink.webhook_url is not set".to_string(),
            ));
        }
        Ok(())
    }
}
