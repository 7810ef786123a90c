//! Server configuration read from environment variables.
//!
//! - `MOMA_DB_PATH`: SQLite database file path (default: "moma.db")
//! - `MOMA_HOST`: listen address (default: "0.0.0.0")
//! - `MOMA_PORT`: listen port (default: 8000)
//! - `MOMA_STRICT_SCHEMA`: reject graphs failing validation (default: true)

use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = "moma.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid MOMA_PORT value {0:?}")]
    InvalidPort(String),

    #[error("invalid MOMA_STRICT_SCHEMA value {0:?}")]
    InvalidFlag(String),
}

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: String,
    pub host: String,
    pub port: u16,
    pub strict_schema: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            db_path: DEFAULT_DB_PATH.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            strict_schema: true,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();
        if let Some(path) = lookup("MOMA_DB_PATH") {
            config.db_path = path;
        }
        if let Some(host) = lookup("MOMA_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("MOMA_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(flag) = lookup("MOMA_STRICT_SCHEMA") {
            config.strict_schema = parse_flag(&flag).ok_or(ConfigError::InvalidFlag(flag))?;
        }
        Ok(config)
    }

    /// The `host:port` listen address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr(), "0.0.0.0:8000");
    }

    #[test]
    fn overrides_and_flags() {
        let config = config_from(&[
            ("MOMA_DB_PATH", "/tmp/m.db"),
            ("MOMA_PORT", "9001"),
            ("MOMA_STRICT_SCHEMA", "no"),
        ])
        .unwrap();
        assert_eq!(config.db_path, "/tmp/m.db");
        assert_eq!(config.port, 9001);
        assert!(!config.strict_schema);
    }

    #[test]
    fn bad_values_are_errors() {
        assert_eq!(
            config_from(&[("MOMA_PORT", "eighty")]),
            Err(ConfigError::InvalidPort("eighty".to_string()))
        );
        assert!(config_from(&[("MOMA_STRICT_SCHEMA", "maybe")]).is_err());
    }
}
