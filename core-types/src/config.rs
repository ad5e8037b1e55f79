use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE: &str = "wheel.toml";
pub const ENV_PREFIX: &str = "WHEEL";

/// Runtime knobs for the wheel service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,
    #[serde(default = "default_prize_table_path")]
    pub prize_table_path: PathBuf,
    #[serde(default = "default_bootstrap_ledger")]
    pub bootstrap_ledger: bool,
    /// Shared secret for the admin endpoint. Unset or empty disables it.
    #[serde(default)]
    pub admin_key: Option<String>,
    /// Fixed seed for the prize draw; clock-seeded when absent.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("db.json")
}

fn default_prize_table_path() -> PathBuf {
    PathBuf::from("public/items.json")
}

fn default_bootstrap_ledger() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            port: default_port(),
            ledger_path: default_ledger_path(),
            prize_table_path: default_prize_table_path(),
            bootstrap_ledger: default_bootstrap_ledger(),
            admin_key: None,
            rng_seed: None,
        }
    }
}

impl AppConfig {
    /// Layers `wheel.toml`, `WHEEL_*` variables and plain variables (`PORT`, `ADMIN_KEY`).
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .add_source(config::Environment::default());
        Self::from_builder(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings = builder.build()?;
        let config: Self = settings.try_deserialize()?;
        config.bind_addr()?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_host
            .parse()
            .map_err(|_| ConfigError::InvalidBindHost {
                value: self.bind_host.clone(),
            })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// The configured admin secret, byte for byte. A blank value counts as unset.
    pub fn admin_secret(&self) -> Option<&str> {
        self.admin_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
    #[error("bind_host '{value}' is not an IP address")]
    InvalidBindHost { value: String },
}
