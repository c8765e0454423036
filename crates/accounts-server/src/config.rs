use std::net::SocketAddr;

use accounts_auth::AuthConfig;
use serde::{Deserialize, Serialize};

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "accounts.toml";

/// Prefix for environment overrides, e.g. `ACCOUNTS__SERVER__PORT=9090`.
pub const ENV_PREFIX: &str = "ACCOUNTS";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        if self.storage.backend == StorageBackend::Postgres {
            if self.storage.postgres.url.trim().is_empty() {
                return Err("storage.postgres.url is required for the postgres backend".into());
            }
            if self.storage.postgres.pool_size == 0 {
                return Err("storage.postgres.pool_size must be > 0".into());
            }
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        self.auth
            .validate()
            .map_err(|e| format!("auth config error: {e}"))?;
        Ok(())
    }

    /// Listen address. An unparseable host falls back to all interfaces.
    pub fn addr(&self) -> SocketAddr {
        let ip = self
            .server
            .host
            .parse()
            .unwrap_or_else(|_| std::net::IpAddr::from([0, 0, 0, 0]));
        SocketAddr::new(ip, self.server.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    64 * 1024
}

/// Which `UserStorage` implementation backs the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    #[default]
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub postgres: PostgresStorageConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PostgresStorageConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for PostgresStorageConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            pool_size: default_pool_size(),
        }
    }
}

// The url may embed a password.
impl std::fmt::Debug for PostgresStorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStorageConfig")
            .field("url", &"<redacted>")
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

fn default_pool_size() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub mod loader {
    use super::{AppConfig, DEFAULT_CONFIG_FILE, ENV_PREFIX};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Loads the file at `path` (or the default file) if it exists, then
    /// applies `ACCOUNTS__*` environment overrides and validates the result.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accounts_auth::TokenConfig;

    fn valid() -> AppConfig {
        AppConfig {
            auth: AuthConfig {
                token: TokenConfig::with_secret("0123456789abcdef0123456789abcdef"),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert_eq!(cfg.storage.postgres.pool_size, 10);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_validate_accepts_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_secret() {
        let err = AppConfig::default().validate().unwrap_err();
        assert!(err.starts_with("auth config error"), "{err}");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = valid();
        cfg.server.port = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = valid();
        cfg.logging.level = "loud".into();
        assert!(cfg.validate().is_err());

        let mut cfg = valid();
        cfg.storage.backend = StorageBackend::Postgres;
        assert!(cfg.validate().is_err());
        cfg.storage.postgres.url = "postgres://localhost/accounts".into();
        assert!(cfg.validate().is_ok());
        cfg.storage.postgres.pool_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_addr_falls_back_to_all_interfaces() {
        let mut cfg = valid();
        cfg.server.host = "not-an-ip".into();
        cfg.server.port = 9000;
        assert_eq!(cfg.addr().to_string(), "0.0.0.0:9000");
    }

    #[test]
    fn test_postgres_debug_hides_url() {
        let pg = PostgresStorageConfig {
            url: "postgres://u:hunter2@db/accounts".into(),
            pool_size: 4,
        };
        assert!(!format!("{pg:?}").contains("hunter2"));
    }
}
