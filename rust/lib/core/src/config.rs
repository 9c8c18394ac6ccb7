use std::path::PathBuf;

use serde::Deserialize;

use crate::rate_limit::RateLimitConfig;

/// Request bodies larger than this are rejected before they reach a handler.
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Server configuration.
///
/// The server binary fills this from command-line flags, environment
/// variables and an optional TOML file, then hands it to store
/// initialization and router construction.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen address for the HTTP server.
    pub listen: String,

    /// Directory holding the database file.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb database file.
    /// Defaults to `{data_dir}/intake.redb` if not specified.
    pub db_path: Option<PathBuf>,

    /// The single origin allowed to make cross-origin requests.
    pub allowed_origin: String,

    /// Maximum accepted request body, in bytes.
    pub body_limit: usize,

    /// Per-client request budget for `/api` paths.
    pub rate_limit: RateLimitConfig,

    /// Allowed product line codes. Empty means any code matching the
    /// product line pattern is accepted.
    pub product_lines: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:5000".to_string(),
            data_dir: None,
            db_path: None,
            allowed_origin: "http://localhost:3000".to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
            rate_limit: RateLimitConfig::default(),
            product_lines: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Resolve the redb database path, falling back to `{data_dir}/intake.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("intake.redb"))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.body_limit, 10 * 1024 * 1024);
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window_secs, 15 * 60);
        assert!(config.product_lines.is_empty());
        assert_eq!(config.resolve_db_path(), PathBuf::from("intake.redb"));
    }

    #[test]
    fn test_resolve_db_path() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        assert_eq!(config.resolve_db_path(), PathBuf::from("/data/intake.redb"));

        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            db_path: Some(PathBuf::from("/elsewhere/x.redb")),
            ..Default::default()
        };
        assert_eq!(config.resolve_db_path(), PathBuf::from("/elsewhere/x.redb"));
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: ServiceConfig = serde_json::from_value(serde_json::json!({
            "allowed_origin": "https://forms.example.com",
            "rate_limit": {"max_requests": 5},
        }))
        .unwrap();
        assert_eq!(config.allowed_origin, "https://forms.example.com");
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_secs, 15 * 60);
        assert_eq!(config.listen, "0.0.0.0:5000");
    }
}
