use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::info;

/// Runtime settings, read from the environment (and `.env` if present).
pub struct Config {
    pub host: String,
    pub port: u16,
    pub env: String,
    pub db_path: PathBuf,
    pub storage_dir: PathBuf,
    pub public_url: String,
    pub static_dir: PathBuf,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        let port: u16 = parse_or("WAYFARER_PORT", 3000)?;

        Ok(Self {
            host: var_or("WAYFARER_HOST", "0.0.0.0"),
            port,
            env: var_or("WAYFARER_ENV", "dev"),
            db_path: var_or("WAYFARER_DB_PATH", "wayfarer.db").into(),
            storage_dir: var_or("WAYFARER_STORAGE_DIR", "./storage").into(),
            public_url: var_or("WAYFARER_PUBLIC_URL", &format!("http://localhost:{}", port)),
            static_dir: var_or("WAYFARER_STATIC_DIR", "./frontend/dist").into(),
            max_body_bytes: parse_or("WAYFARER_MAX_BODY_BYTES", 10 * 1024 * 1024)?,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key} value {raw:?}")),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
