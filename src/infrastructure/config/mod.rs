use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

/// Runtime configuration, merged from defaults, `datalens.toml` and
/// `DATALENS_`-prefixed environment variables (highest precedence).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Rows per persistence batch during ingestion.
    pub row_batch_size: usize,
    /// Cap on a CSV body fetched from a URL.
    pub max_fetch_bytes: usize,
    /// Ingest the built-in sample datasets at startup (skips names that
    /// already exist).
    pub seed_samples: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            database_path: "datalens.db".to_string(),
            row_batch_size: 100,
            max_fetch_bytes: 16 * 1024 * 1024,
            seed_samples: false,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("datalens.toml"))
            .merge(Env::prefixed("DATALENS_"))
            .extract()
            .map_err(|e| AppError::Internal(format!("Failed to load configuration: {e}")))
    }
}
