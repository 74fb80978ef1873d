//! Environment-derived bridge configuration

use fxbridge_rcon::RconConfig;
use std::path::PathBuf;

/// Configuration assembled from environment variables. Fields stay
/// optional so callers can distinguish "unset" from a default.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub password: Option<String>,
    pub logs_dir: Option<PathBuf>,
}

impl BridgeConfig {
    /// Read `RCON_ADDRESS`, `RCON_PORT`, `RCON_PASSWORD` and
    /// `FXSERVER_LOGS_DIR` from the environment.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("RCON_ADDRESS").ok(),
            port: std::env::var("RCON_PORT")
                .ok()
                .and_then(|port| port.parse().ok()),
            password: std::env::var("RCON_PASSWORD").ok(),
            logs_dir: std::env::var("FXSERVER_LOGS_DIR").ok().map(PathBuf::from),
        }
    }

    /// All three connection variables are present
    pub fn has_auto_connect(&self) -> bool {
        self.host.is_some() && self.port.is_some() && self.password.is_some()
    }

    /// Connection descriptor with defaults applied
    pub fn rcon(&self) -> RconConfig {
        RconConfig::new(
            self.host.clone().unwrap_or_else(|| "localhost".to_string()),
            self.port.unwrap_or(30120),
            self.password.clone().unwrap_or_default(),
        )
    }
}
