//! Server configuration loading.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file (`--config`), then flags and `INTAKE_*` environment variables.

use std::path::{Path, PathBuf};

use clap::Args;
use intake_core::ServiceConfig;

/// Settings that can be given on the command line or in the environment.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Listen address.
    #[arg(long, env = "INTAKE_LISTEN")]
    pub listen: Option<String>,

    /// Data directory; the database defaults to `{data_dir}/intake.redb`.
    #[arg(long, env = "INTAKE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Database file path.
    #[arg(long = "db", env = "INTAKE_DB")]
    pub db_path: Option<PathBuf>,

    /// The one origin allowed to call the API from a browser.
    #[arg(long, env = "INTAKE_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    /// Comma-separated catalog of accepted product line codes.
    #[arg(long, env = "INTAKE_PRODUCT_LINES", value_delimiter = ',')]
    pub product_lines: Option<Vec<String>>,
}

/// Read a TOML config file.
pub fn load_file(path: &Path) -> anyhow::Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("read {}: {}", path.display(), e))?;
    let config: ServiceConfig = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("parse {}: {}", path.display(), e))?;
    Ok(config)
}

/// Build the effective configuration.
pub fn resolve(file: Option<&Path>, overrides: Overrides) -> anyhow::Result<ServiceConfig> {
    let mut config = match file {
        Some(path) => load_file(path)?,
        None => ServiceConfig::default(),
    };
    apply(&mut config, overrides);
    Ok(config)
}

fn apply(config: &mut ServiceConfig, o: Overrides) {
    if let Some(listen) = o.listen {
        config.listen = listen;
    }
    if o.data_dir.is_some() {
        config.data_dir = o.data_dir;
    }
    if o.db_path.is_some() {
        config.db_path = o.db_path;
    }
    if let Some(origin) = o.allowed_origin {
        config.allowed_origin = origin;
    }
    if let Some(lines) = o.product_lines {
        config.product_lines = lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
    }
}
