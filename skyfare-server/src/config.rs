//! Server configuration from the environment

use std::net::SocketAddr;
use std::path::PathBuf;

use simplelog::LevelFilter;
use skyfare_lib::DEFAULT_BASE_URL;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3001";

/// Error raised for an unusable configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Settings read from `AMADEUS_*`, `FRONTEND_URL` and `SKYFARE_*` variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub base_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Value of `Access-Control-Allow-Origin`.
    pub frontend_url: String,
    pub bind: SocketAddr,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first, if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind = get("SKYFARE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind.parse().map_err(|_| ConfigError::Invalid {
            var: "SKYFARE_BIND",
            value: bind.clone(),
        })?;

        let log_level = match get("SKYFARE_LOG") {
            Some(level) => level.parse().map_err(|_| ConfigError::Invalid {
                var: "SKYFARE_LOG",
                value: level.clone(),
            })?,
            None => LevelFilter::Info,
        };

        Ok(Self {
            base_url: get("AMADEUS_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client_id: get("AMADEUS_CLIENT_ID"),
            client_secret: get("AMADEUS_CLIENT_SECRET"),
            frontend_url: get("FRONTEND_URL").unwrap_or_else(|| "*".to_string()),
            bind,
            log_level,
            log_file: get("SKYFARE_LOG_FILE").map(PathBuf::from),
        })
    }
}
