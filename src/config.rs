//! Service configuration from environment variables.
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `HTTP_PORT` | yes | |
//! | `HTTP_HOST` | no | `0.0.0.0` |
//! | `DATABASE_PATH` | no | in-memory directories |
//! | `DB_MAX_CONNECTIONS` | no | `5` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::db::pool::PoolSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// One line per missing or malformed variable.
    #[error("config validation failed:\n  {}", .0.join("\n  "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// SQLite database file. `None` keeps all data in memory.
    pub database_path: Option<PathBuf>,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut errors = Vec::new();

        let port = match get("HTTP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| errors.push(format!("HTTP_PORT must be a valid port, got {:?}", raw)))
                .ok(),
            None => {
                errors.push("HTTP_PORT is required".to_string());
                None
            }
        };

        let host = match get("HTTP_HOST") {
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .map_err(|_| errors.push(format!("HTTP_HOST must be an IP address, got {:?}", raw)))
                .ok(),
            None => Some(IpAddr::from([0, 0, 0, 0])),
        };

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    errors.push(format!(
                        "DB_MAX_CONNECTIONS must be a positive number, got {:?}",
                        raw
                    ));
                    None
                }
            },
            None => Some(PoolSettings::default().max_connections),
        };

        let database_path = get("DATABASE_PATH").map(PathBuf::from);

        match (host, port, db_max_connections) {
            (Some(host), Some(port), Some(db_max_connections)) if errors.is_empty() => Ok(Config {
                host,
                port,
                database_path,
                db_max_connections,
            }),
            _ => Err(ConfigError::Invalid(errors)),
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.db_max_connections,
            ..PoolSettings::default()
        }
    }
}
