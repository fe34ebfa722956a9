//! Application settings, read from `moneta.toml` with `MONETA_*`
//! environment overrides.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level filter applied to all workspace crates.
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    /// In-memory sqlite, useful for local experiments.
    Memory,
    /// Sqlite file path, created on first start.
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name("moneta").required(false))
            .add_source(Environment::with_prefix("MONETA").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
