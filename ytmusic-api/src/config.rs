//! Client configuration, persisted to `~/.config/ytmusic/config.json`.
//!
//! ```json
//! {
//!   "language": "en",
//!   "location": "US",
//!   "http": { "timeout_ms": 30000, "max_retries": 3, "retry_base_delay_ms": 1000 }
//! }
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use crate::error::{Result, YtMusicError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Retry and timeout settings for the resilient transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay for exponential backoff, in milliseconds.
    pub retry_base_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 3,
            retry_base_delay_ms: 1_000,
        }
    }
}

impl HttpConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// Session-level settings: locale context and transport tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Interface language sent as `context.client.hl`.
    pub language: String,
    /// Content country sent as `context.client.gl`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Brand account id sent as `context.user.onBehalfOfUser`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub http: HttpConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            language: "en".to_owned(),
            location: None,
            user: None,
            http: HttpConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load from `~/.config/ytmusic/config.json`.
    ///
    /// Returns the default config if the file does not exist.
    pub fn load() -> Result<Self> {
        let path = config_path("config.json")?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Save to disk, creating parent directories if needed.
    pub fn save(&self) -> Result<()> {
        let path = config_path("config.json")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Path of `name` inside the `ytmusic` config directory.
pub fn config_path(name: &str) -> Result<PathBuf> {
    let config = dirs::config_dir()
        .ok_or_else(|| YtMusicError::Other("cannot determine config directory".into()))?;
    Ok(config.join("ytmusic").join(name))
}
