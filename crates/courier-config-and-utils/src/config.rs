//! Configuration management for the daemon.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default port for the HTTP ingress.
pub const DEFAULT_HTTP_PORT: u16 = 3002;

/// Default messaging gateway URL.
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:3100";

/// Delivery queue settings. Global for the queue, never per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySettings {
    /// Wall-clock bound for a single delivery attempt.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
    /// Attempts per item, counting the first try.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_send_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    3
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            send_timeout_ms: default_send_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl DeliverySettings {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

/// Connection health settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSettings {
    /// Interval between liveness checks while connected.
    #[serde(default = "default_liveness_interval_secs")]
    pub liveness_interval_secs: u64,
    /// Base of the linear reconnect backoff (attempt n waits base * n).
    #[serde(default = "default_reconnect_base_delay_secs")]
    pub reconnect_base_delay_secs: u64,
    /// Reconnect attempts before giving up until a manual restart.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Settle delay before re-initializing on manual restart.
    #[serde(default = "default_restart_settle_ms")]
    pub restart_settle_ms: u64,
}

fn default_liveness_interval_secs() -> u64 {
    300
}

fn default_reconnect_base_delay_secs() -> u64 {
    30
}

fn default_max_reconnect_attempts() -> u32 {
    10
}

fn default_restart_settle_ms() -> u64 {
    1_000
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            liveness_interval_secs: default_liveness_interval_secs(),
            reconnect_base_delay_secs: default_reconnect_base_delay_secs(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            restart_settle_ms: default_restart_settle_ms(),
        }
    }
}

impl LinkSettings {
    pub fn liveness_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_interval_secs)
    }

    pub fn reconnect_base_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_base_delay_secs)
    }

    pub fn restart_settle_delay(&self) -> Duration {
        Duration::from_millis(self.restart_settle_ms)
    }
}

/// Main daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Port the HTTP ingress listens on.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Base URL of the messaging gateway.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    /// How often the gateway transport polls its status endpoint.
    #[serde(default = "default_gateway_status_poll_secs")]
    pub gateway_status_poll_secs: u64,
    #[serde(default)]
    pub delivery: DeliverySettings,
    #[serde(default)]
    pub link: LinkSettings,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

fn default_gateway_status_poll_secs() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            http_port: DEFAULT_HTTP_PORT,
            gateway_url: default_gateway_url(),
            gateway_status_poll_secs: default_gateway_status_poll_secs(),
            delivery: DeliverySettings::default(),
            link: LinkSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides and validate.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("COURIER_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(port) = std::env::var("COURIER_HTTP_PORT")
            .ok()
            .and_then(|raw| raw.trim().parse::<u16>().ok())
        {
            self.http_port = port;
        }
        if let Ok(url) = std::env::var("COURIER_GATEWAY_URL") {
            if !url.trim().is_empty() {
                self.gateway_url = url.trim().to_string();
            }
        }
    }

    /// Reject settings the delivery and reconnect machinery cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.delivery.max_retries == 0 {
            return Err(CoreError::Config(
                "delivery.max_retries must be at least 1".to_string(),
            ));
        }
        if self.delivery.send_timeout_ms == 0 {
            return Err(CoreError::Config(
                "delivery.send_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.link.liveness_interval_secs == 0 {
            return Err(CoreError::Config(
                "link.liveness_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.gateway_status_poll_secs == 0 {
            return Err(CoreError::Config(
                "gateway_status_poll_secs must be greater than 0".to_string(),
            ));
        }
        self.gateway_url()?;
        Ok(())
    }

    /// Get the gateway URL as a parsed URL.
    ///
    /// The path always ends in `/` so endpoints joined onto it keep any
    /// path prefix the gateway is mounted under.
    pub fn gateway_url(&self) -> CoreResult<Url> {
        let mut url = Url::parse(&self.gateway_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}
