use std::path::PathBuf;

use anyhow::{anyhow, Result};
use frag_axum::DEFAULT_BODY_LIMIT;
use frag_blob::StoreConfig;

/// Process configuration, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_url: Option<String>,
    pub htpasswd_file: PathBuf,
    pub store: StoreConfig,
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Read `.env` (if present) and then the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let htpasswd_file = non_empty("HTPASSWD_FILE")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("HTPASSWD_FILE must point at an htpasswd file"))?;

        Ok(Self {
            host: non_empty("HTTP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var_or(&lookup, "PORT", 8080),
            api_url: non_empty("API_URL"),
            htpasswd_file,
            store: StoreConfig::from_lookup(&lookup),
            max_body_bytes: var_or(&lookup, "MAX_BODY_BYTES", DEFAULT_BODY_LIMIT),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn var_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
