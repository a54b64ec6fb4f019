//! Configuration management for the review manager
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REVMAN_*)
//! 3. Config file (~/.config/revman/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// SQLite database settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// How long a connection waits on a locked database
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("revman")
            .join("revman.db");

        Self {
            path,
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl DatabaseConfig {
    /// Create a database config with the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

/// Assignment engine settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deadline for a single operation, including its transaction
    #[serde(with = "humantime_serde")]
    pub operation_timeout: Option<Duration>,

    /// Seed for reviewer selection; random when unset
    pub seed: Option<u64>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub engine: EngineConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::bad_request(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/revman/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("revman").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REVMAN_DB_PATH: Path to the database file
    /// - REVMAN_SEED: Reviewer selection seed
    /// - REVMAN_OPERATION_TIMEOUT: Operation deadline, e.g. `10s`
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = lookup("REVMAN_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(seed) = lookup("REVMAN_SEED") {
            let seed = seed
                .parse()
                .map_err(|e| Error::bad_request(format!("Invalid REVMAN_SEED: {}", e)))?;
            self.engine.seed = Some(seed);
        }

        if let Some(timeout) = lookup("REVMAN_OPERATION_TIMEOUT") {
            let timeout = humantime_serde::re::humantime::parse_duration(&timeout).map_err(|e| {
                Error::bad_request(format!("Invalid REVMAN_OPERATION_TIMEOUT: {}", e))
            })?;
            self.engine.operation_timeout = Some(timeout);
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, db_path: Option<PathBuf>, seed: Option<u64>) -> Self {
        if let Some(path) = db_path {
            self.database.path = path;
        }

        if let Some(seed) = seed {
            self.engine.seed = Some(seed);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        config_file: Option<&Path>,
        db_path: Option<PathBuf>,
        seed: Option<u64>,
    ) -> Result<Self> {
        let base = match config_file {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        Ok(base.with_env_overrides()?.with_cli_overrides(db_path, seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.database.path.ends_with("revman/revman.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.busy_timeout, Duration::from_secs(5));
        assert!(config.engine.seed.is_none());
        assert!(config.engine.operation_timeout.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[database]
path = "/var/lib/revman/revman.db"
max_connections = 8
busy_timeout = "2s"

[engine]
operation_timeout = "500ms"
seed = 42
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/var/lib/revman/revman.db"));
        assert_eq!(config.database.max_connections, 8);
        assert_eq!(config.database.busy_timeout, Duration::from_secs(2));
        assert_eq!(config.engine.operation_timeout, Some(Duration::from_millis(500)));
        assert_eq!(config.engine.seed, Some(42));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[engine]
seed = 7
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // database section should use defaults
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.engine.seed, Some(7));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_overrides_from(|key| match key {
                "REVMAN_DB_PATH" => Some("/tmp/env.db".to_string()),
                "REVMAN_SEED" => Some("99".to_string()),
                "REVMAN_OPERATION_TIMEOUT" => Some("3s".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/env.db"));
        assert_eq!(config.engine.seed, Some(99));
        assert_eq!(config.engine.operation_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_invalid_env_seed() {
        let result = Config::default().with_overrides_from(|key| {
            (key == "REVMAN_SEED").then(|| "not-a-number".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let config =
            Config::default().with_cli_overrides(Some(PathBuf::from("/custom/revman.db")), Some(1));

        assert_eq!(config.database.path, PathBuf::from("/custom/revman.db"));
        assert_eq!(config.engine.seed, Some(1));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database]\nmax_connections = 2\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.database.max_connections, 2);
    }
}
