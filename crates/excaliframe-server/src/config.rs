//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DIST_DIR: &str = "dist";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid PORT {0:?}: {1}")]
    InvalidPort(String, std::num::ParseIntError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Build output holding the pages, bundles and descriptor.
    pub dist_dir: PathBuf,
    /// Public host name. When set, `www.` and plain-http requests for it are
    /// redirected.
    pub canonical_host: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            dist_dir: PathBuf::from(DEFAULT_DIST_DIR),
            canonical_host: None,
        }
    }
}

impl ServerConfig {
    /// Read `PORT`, `DIST_DIR` and `CANONICAL_HOST`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidPort(raw.clone(), e))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            dist_dir: non_empty("DIST_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DIST_DIR)),
            canonical_host: non_empty("CANONICAL_HOST").map(|h| h.trim().to_string()),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn dist_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dist_dir.join(relative)
    }
}
