//! Process configuration.
//!
//! Read once at startup from a JSON file:
//!
//! ```json
//! {
//!     "server_port": 8080,
//!     "mysql_username": "ingest",
//!     "mysql_password": "secret",
//!     "mysql_server": "127.0.0.1",
//!     "mysql_database": "events",
//!     "mysql_port": 3306
//! }
//! ```
//!
//! `bind_address`, `database_url` and `acquire_timeout_secs` are optional.
//! When `database_url` is present it replaces the URL assembled from the
//! `mysql_*` keys.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Listener and store settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    pub server_port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub mysql_username: String,
    #[serde(default)]
    pub mysql_password: String,
    #[serde(default)]
    pub mysql_server: String,
    #[serde(default)]
    pub mysql_database: String,
    #[serde(default = "default_mysql_port")]
    pub mysql_port: u16,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

/// Errors loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_acquire_timeout_secs() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_SECS
}

impl ServerConfig {
    /// Load and validate a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parse and validate configuration file contents.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_port == 0 {
            return Err(ConfigError::Invalid {
                message: "server_port must be non-zero".to_string(),
            });
        }
        if self.acquire_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "acquire_timeout_secs must be non-zero".to_string(),
            });
        }
        match &self.database_url {
            Some(url) if url.is_empty() => Err(ConfigError::Invalid {
                message: "database_url is empty".to_string(),
            }),
            Some(_) => Ok(()),
            None if self.mysql_server.is_empty() => Err(ConfigError::Invalid {
                message: "mysql_server is required when database_url is not set".to_string(),
            }),
            None if self.mysql_database.is_empty() => Err(ConfigError::Invalid {
                message: "mysql_database is required when database_url is not set".to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Address the HTTP listener binds to.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.server_port)
    }

    /// Store connection URL.
    pub fn database_url(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }
        let credentials = match (self.mysql_username.is_empty(), self.mysql_password.is_empty()) {
            (true, _) => String::new(),
            (false, true) => format!("{}@", urlencoding::encode(&self.mysql_username)),
            (false, false) => format!(
                "{}:{}@",
                urlencoding::encode(&self.mysql_username),
                urlencoding::encode(&self.mysql_password)
            ),
        };
        format!(
            "mysql://{}{}:{}/{}",
            credentials,
            self.mysql_server,
            self.mysql_port,
            urlencoding::encode(&self.mysql_database)
        )
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

// Passwords must not end up in logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("server_port", &self.server_port)
            .field("bind_address", &self.bind_address)
            .field("mysql_username", &self.mysql_username)
            .field("mysql_password", &"<redacted>")
            .field("mysql_server", &self.mysql_server)
            .field("mysql_database", &self.mysql_database)
            .field("mysql_port", &self.mysql_port)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "<redacted>"),
            )
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}
