//! Client-side settings.
//!
//! Reads/writes `~/.intake/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use intake_client::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Client configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Service base URL (e.g. "http://localhost:5000").
    pub server: String,

    /// Total submit attempts, including the first.
    pub retries: u32,

    /// Pause between submit attempts, in milliseconds.
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Local store holding the draft. Defaults to `~/.intake/local.redb`.
    #[serde(rename = "local-db", skip_serializing_if = "Option::is_none")]
    pub local_db: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            server: "http://localhost:5000".to_string(),
            retries: retry.max_attempts,
            retry_delay_ms: retry.delay.as_millis() as u64,
            local_db: None,
        }
    }
}

impl ClientConfig {
    /// Default config file path: ~/.intake/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retries.max(1),
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Where the local draft store lives.
    pub fn local_db_path(&self) -> PathBuf {
        self.local_db
            .clone()
            .unwrap_or_else(|| dirs_path().join("local.redb"))
    }
}

/// Return the intake config directory (~/.intake).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".intake")
}
