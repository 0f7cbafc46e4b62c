use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::remote;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: remote::http::Settings,
}

impl Settings {
    /// `.env`, then `config/default.toml` if present, then `DASHBOARD__*` variables.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_sources(Some("config/default"))
    }

    pub fn from_sources(file: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder().set_default("api.timeout_secs", 10)?;
        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }
        builder
            .add_source(Environment::with_prefix("DASHBOARD").separator("__"))
            .build()?
            .try_deserialize()
            .context("dashboard settings are incomplete, is DASHBOARD__API__BASE_URL set?")
    }
}
