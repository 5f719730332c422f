use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

pub const CONFIG_FILE: &str = "storyqa.toml";
pub const ENV_PREFIX: &str = "STORYQA_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding every CSV table and generated source file.
    pub data_dir: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `storyqa=debug`.
    pub log_filter: String,
    /// Messages buffered per WebSocket listener before it starts lagging.
    pub broadcast_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            data_dir: PathBuf::from("data"),
            log_filter: "info".to_string(),
            broadcast_capacity: 100,
        }
    }
}

pub struct ConfigService {
    figment: Figment,
}

impl ConfigService {
    /// Defaults, then `storyqa.toml` if present, then `STORYQA_*` variables.
    pub fn new() -> Self {
        Self::from_figment(
            Figment::from(Serialized::defaults(ServerConfig::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn load(&self) -> Result<ServerConfig> {
        let config: ServerConfig = self
            .figment
            .extract()
            .map_err(|e| AppError::ValidationError(format!("Invalid configuration: {}", e)))?;

        if config.broadcast_capacity == 0 {
            return Err(AppError::ValidationError(
                "broadcast_capacity must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
