//! Configuration module for roomcast.

use serde::Deserialize;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;

use crate::{RelayError, Result};

/// Listening endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Resolve host and port into the address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| {
                RelayError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    self.host, self.port
                ))
            })?
            .next()
            .ok_or_else(|| {
                RelayError::Config(format!(
                    "server address {}:{} did not resolve",
                    self.host, self.port
                ))
            })
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/roomcast.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Listening endpoint.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RelayError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RelayError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `ROOMCAST_HOST`: bind address
    /// - `ROOMCAST_PORT`: listening port
    /// - `ROOMCAST_LOG_LEVEL`: log level
    ///
    /// Empty values and ports that do not parse are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("ROOMCAST_HOST") {
            if !host.is_empty() {
                self.server.host = host;
            }
        }

        if let Ok(port) = std::env::var("ROOMCAST_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) if port.is_empty() => {}
                Err(e) => tracing::warn!("Ignoring ROOMCAST_PORT={port:?}: {e}"),
            }
        }

        if let Ok(level) = std::env::var("ROOMCAST_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the server host and port do not form a bindable address.
    pub fn validate(&self) -> Result<()> {
        self.server.socket_addr().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/roomcast.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[logging]
level = "debug"
file = "custom/logs/relay.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/relay.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[server]
port = 3000
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.file, "logs/roomcast.log");
    }

    #[test]
    fn test_parse_invalid_config() {
        let toml = "this is not valid toml [[[";
        let result = Config::parse(toml);

        assert!(result.is_err());
        if let Err(RelayError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");

        assert!(matches!(result, Err(RelayError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nhost = \"127.0.0.1\"\nport = 4040").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4040);
    }

    #[test]
    fn test_apply_env_overrides_host() {
        let original = std::env::var("ROOMCAST_HOST").ok();

        std::env::set_var("ROOMCAST_HOST", "127.0.0.1");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.server.host, "127.0.0.1");

        if let Some(val) = original {
            std::env::set_var("ROOMCAST_HOST", val);
        } else {
            std::env::remove_var("ROOMCAST_HOST");
        }
    }

    #[test]
    fn test_apply_env_overrides_invalid_port() {
        let original = std::env::var("ROOMCAST_PORT").ok();

        std::env::set_var("ROOMCAST_PORT", "not-a-port");

        let mut config = Config::default();
        config.server.port = 1234;
        config.apply_env_overrides();

        // Unparsable value keeps the configured port
        assert_eq!(config.server.port, 1234);

        if let Some(val) = original {
            std::env::set_var("ROOMCAST_PORT", val);
        } else {
            std::env::remove_var("ROOMCAST_PORT");
        }
    }

    #[test]
    fn test_apply_env_overrides_empty_log_level() {
        let original = std::env::var("ROOMCAST_LOG_LEVEL").ok();

        std::env::set_var("ROOMCAST_LOG_LEVEL", "");

        let mut config = Config::default();
        config.logging.level = "warn".to_string();
        config.apply_env_overrides();

        assert_eq!(config.logging.level, "warn");

        if let Some(val) = original {
            std::env::set_var("ROOMCAST_LOG_LEVEL", val);
        } else {
            std::env::remove_var("ROOMCAST_LOG_LEVEL");
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let addr = config.socket_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 0);
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_host() {
        let mut config = Config::default();
        config.server.host = "not a host name!".to_string();

        let result = config.validate();
        assert!(matches!(result, Err(RelayError::Config(_))));
    }
}
