//! Configuration management with validation and defaults

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{StakehouseError, StakehouseResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StakehouseConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub game: GameConfig,
}

impl Default for StakehouseConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            game: GameConfig::default(),
        }
    }
}

/// HTTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec![],
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_directory: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_directory: "./data/stakehouse".to_string(),
        }
    }
}

/// Gameplay configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Balance granted to newly created players, in cents
    pub starting_balance_cents: i64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_balance_cents: 100_000,
        }
    }
}

impl StakehouseConfig {
    /// Validate configuration for logical consistency
    pub fn validate(&self) -> StakehouseResult<()> {
        if self.server.port == 0 {
            return Err(StakehouseError::validation("server.port must be > 0"));
        }
        if self.server.request_timeout_seconds == 0 {
            return Err(StakehouseError::validation(
                "server.request_timeout_seconds must be > 0",
            ));
        }
        if self.storage.data_directory.is_empty() {
            return Err(StakehouseError::validation(
                "storage.data_directory must not be empty",
            ));
        }
        if self.game.starting_balance_cents < 0 {
            return Err(StakehouseError::validation(
                "game.starting_balance_cents must be >= 0",
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> StakehouseResult<StakehouseConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            StakehouseConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> StakehouseResult<StakehouseConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StakehouseError::validation(format!("failed to read {}: {}", path, e))
        })?;

        toml::from_str(&content)
            .map_err(|e| StakehouseError::validation(format!("failed to parse {}: {}", path, e)))
    }

    fn apply_env_overrides(&self, config: &mut StakehouseConfig) -> StakehouseResult<()> {
        if let Ok(host) = env::var("STAKEHOUSE_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("STAKEHOUSE_PORT") {
            config.server.port = port.parse().map_err(|_| {
                StakehouseError::validation(format!("STAKEHOUSE_PORT is not a port: {}", port))
            })?;
        }
        if let Ok(data_dir) = env::var("STAKEHOUSE_DATA_DIR") {
            config.storage.data_directory = data_dir;
        }
        if let Ok(balance) = env::var("STAKEHOUSE_STARTING_BALANCE_CENTS") {
            config.game.starting_balance_cents = balance.parse().map_err(|_| {
                StakehouseError::validation(format!(
                    "STAKEHOUSE_STARTING_BALANCE_CENTS is not an integer: {}",
                    balance
                ))
            })?;
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = StakehouseConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn zero_port_fails_validation() {
        let mut config = StakehouseConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_starting_balance_fails_validation() {
        let mut config = StakehouseConfig::default();
        config.game.starting_balance_cents = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let parsed: StakehouseConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [game]
            starting_balance_cents = 5000
            "#,
        )
        .unwrap();

        assert_eq!(parsed.server.port, 9000);
        assert_eq!(parsed.server.host, "0.0.0.0");
        assert_eq!(parsed.game.starting_balance_cents, 5_000);
        assert_eq!(parsed.storage.data_directory, "./data/stakehouse");
    }

    #[test]
    fn load_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stakehouse.toml");
        let mut config = StakehouseConfig::default();
        config.server.port = 9191;
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = ConfigLoader::new().with_path(&path).load().unwrap();
        assert_eq!(loaded.server.port, 9191);
    }
}
