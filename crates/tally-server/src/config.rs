use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tally_service::{PagingConfig, ServiceConfig};

use crate::error::{ServerError, ServerResult};

/// Server configuration. Every field has a default, so a partial TOML file
/// is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,
    pub service: ServiceConfig,
    pub paging: PagingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".into(),
            service: ServiceConfig::default(),
            paging: PagingConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }
}
