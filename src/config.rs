//! Runtime configuration for the `labelstore` binary.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `LABELSTORE_*` environment variables (a `.env` file is honored by the
//! binary before `Config::load` runs).

use std::path::Path;

use serde::Deserialize;

use crate::error::{LabelStoreError, Result};
use crate::store::DEFAULT_TOP_K;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Embedding dimension every entry must have.
    pub dimension: usize,
    /// `top_k` used when a search request does not name one.
    pub default_top_k: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `vector_label_store=debug`.
    pub level: String,
    /// `json` or `pretty`.
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dimension: 384,
            default_top_k: DEFAULT_TOP_K,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load defaults, overlay the TOML file at `path` (if any), then the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| LabelStoreError::Config(e.to_string()))
    }

    /// Apply `LABELSTORE_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("LABELSTORE_ADDR") {
            self.server.addr = addr;
        }
        if let Some(dim) = lookup("LABELSTORE_DIMENSION") {
            self.store.dimension = parse_usize("LABELSTORE_DIMENSION", &dim)?;
        }
        if let Some(top_k) = lookup("LABELSTORE_TOP_K") {
            self.store.default_top_k = parse_usize("LABELSTORE_TOP_K", &top_k)?;
        }
        if let Some(level) = lookup("LABELSTORE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LABELSTORE_LOG_FORMAT") {
            self.logging.format = format;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.dimension == 0 {
            return Err(LabelStoreError::Config(
                "store.dimension must be at least 1".to_string(),
            ));
        }
        if self.store.default_top_k == 0 {
            return Err(LabelStoreError::Config(
                "store.default_top_k must be at least 1".to_string(),
            ));
        }
        match self.logging.format.as_str() {
            "json" | "pretty" => Ok(()),
            other => Err(LabelStoreError::Config(format!(
                "logging.format must be \"json\" or \"pretty\", got {other:?}"
            ))),
        }
    }
}

fn parse_usize(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| LabelStoreError::Config(format!("{key} is not a number: {value:?}")))
}
