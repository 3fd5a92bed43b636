use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

pub const DEFAULT_MODEL_PATH: &str = "price_prediction_model.json";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub model_path: PathBuf,
}

impl AppConfig {
    /// Reads `HOST`, `PORT`, `WORKERS` and `MODEL_PATH`, after loading `.env` if present.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid PORT value '{}'", raw))?,
            None => 8080,
        };

        let workers = match lookup("WORKERS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid WORKERS value '{}'", raw))?,
            None => num_cpus::get(),
        };
        if workers == 0 {
            bail!("WORKERS must be at least 1");
        }

        let model_path = lookup("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        Ok(Self {
            host,
            port,
            workers,
            model_path,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
