//! Server settings layered on top of the shared `AppConfig`.

use bookshelf_core::config::parse_or;
use bookshelf_core::{AppConfig, ConfigError};
use std::net::{Ipv4Addr, SocketAddr};

pub const ENV_BIND: &str = "BOOKSHELF_BIND";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub app: AppConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app = AppConfig::from_lookup(&lookup)?;
        let bind = parse_or(
            ENV_BIND,
            lookup(ENV_BIND)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            "host:port",
        )?;
        Ok(Self { bind, app })
    }
}

#[cfg(test)]
mod tests {
    use super::ServerConfig;

    #[test]
    fn bind_defaults_to_localhost_8000() {
        let config = ServerConfig::from_lookup(|_| None).expect("defaults are valid");
        assert_eq!(config.bind.to_string(), "127.0.0.1:8000");
    }

    #[test]
    fn bind_override_must_be_a_socket_address() {
        let config = ServerConfig::from_lookup(|name| {
            (name == "BOOKSHELF_BIND").then(|| "0.0.0.0:9090".to_string())
        })
        .expect("valid bind");
        assert_eq!(config.bind.port(), 9090);

        let err = ServerConfig::from_lookup(|name| {
            (name == "BOOKSHELF_BIND").then(|| "localhost".to_string())
        })
        .expect_err("missing port must fail");
        assert!(err.to_string().contains("BOOKSHELF_BIND"));
    }
}
