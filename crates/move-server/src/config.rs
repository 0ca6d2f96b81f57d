//! Configuration file loading for the move server.
//!
//! Settings come from a TOML file with a `[server]` and an `[engine]`
//! table. Every key is optional; a missing file means all defaults.

use move_arbiter::EngineConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// HTTP listener and request handling settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HttpConfig {
    /// Address to bind. Defaults to all interfaces.
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served for any path that is not an API route.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Rating used when a move request does not carry one.
    #[serde(default = "default_skill_rating")]
    pub default_skill_rating: i64,
    /// Requests slower than this are logged as warnings.
    #[serde(default = "default_slow_request_ms")]
    pub slow_request_ms: u64,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    5100
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_skill_rating() -> i64 {
    1500
}

fn default_slow_request_ms() -> u64 {
    6000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            default_skill_rating: default_skill_rating(),
            slow_request_ms: default_slow_request_ms(),
        }
    }
}

impl HttpConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn slow_request(&self) -> Duration {
        Duration::from_millis(self.slow_request_ms)
    }
}

/// Everything the server binary needs at startup.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ServerConfig {
    /// Loads the configuration from `path`.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        PathBuf::from("move-server.toml")
    }
}
