//! Environment configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Hour (UTC, 0-23) at which a new study day starts.
    pub daily_reset_hour: u32,
    pub scheduler: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let host = parse_or("HOST", IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)))?;
        let port = parse_or("PORT", 3000u16)?;
        let daily_reset_hour = parse_or("DAILY_RESET_HOUR", 0u32)?;
        if daily_reset_hour > 23 {
            return Err(ConfigError::Invalid {
                name: "DAILY_RESET_HOUR",
                value: daily_reset_hour.to_string(),
            });
        }

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let scheduler = std::env::var("SCHEDULER").unwrap_or_else(|_| "sm2".to_string());

        Ok(Self {
            database_url,
            host,
            port,
            log_level,
            daily_reset_hour,
            scheduler,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
            log_level: "info".to_string(),
            daily_reset_hour: 0,
            scheduler: "sm2".to_string(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
