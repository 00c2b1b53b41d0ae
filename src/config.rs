//! Runtime configuration
//!
//! Values come from `ONBOARDING_*` environment variables and fall back to
//! defaults suitable for local development.

use crate::error::{AppError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const ENV_HOST: &str = "ONBOARDING_HOST";
const ENV_PORT: &str = "ONBOARDING_PORT";
const ENV_DATABASE_PATH: &str = "ONBOARDING_DATABASE_PATH";
const ENV_POLL_INTERVAL_MS: &str = "ONBOARDING_POLL_INTERVAL_MS";
const ENV_PASSWORD_PEPPER: &str = "ONBOARDING_PASSWORD_PEPPER";

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// Progress polling fallback interval. Zero disables the poller.
    pub poll_interval_ms: u64,
    /// Base64-encoded pepper mixed into password hashes
    #[serde(skip_serializing)]
    pub password_pepper: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
            database_path: PathBuf::from("onboarding.db"),
            poll_interval_ms: 400,
            password_pepper: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with("ONBOARDING_"))
            .collect();
        Self::from_vars(&vars)
    }

    /// Build configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = non_empty(vars, ENV_HOST) {
            config.host = host.to_string();
        }
        if let Some(port) = non_empty(vars, ENV_PORT) {
            config.port = port
                .parse()
                .map_err(|e| AppError::Config(format!("{} must be a port number: {}", ENV_PORT, e)))?;
        }
        if let Some(path) = non_empty(vars, ENV_DATABASE_PATH) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(interval) = non_empty(vars, ENV_POLL_INTERVAL_MS) {
            config.poll_interval_ms = interval.parse().map_err(|e| {
                AppError::Config(format!("{} must be an integer: {}", ENV_POLL_INTERVAL_MS, e))
            })?;
        }
        if let Some(pepper) = non_empty(vars, ENV_PASSWORD_PEPPER) {
            config.password_pepper = Some(pepper.to_string());
        }

        // Fail early on a malformed pepper rather than at first login
        config.pepper_bytes()?;

        Ok(config)
    }

    /// Socket address the HTTP server binds to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid address: {}", e)))
    }

    /// Polling interval, if polling is enabled
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_ms > 0).then(|| Duration::from_millis(self.poll_interval_ms))
    }

    /// Decoded password pepper (empty when unset)
    pub fn pepper_bytes(&self) -> Result<Vec<u8>> {
        match &self.password_pepper {
            Some(encoded) => base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| AppError::Config(format!("{} is not valid base64: {}", ENV_PASSWORD_PEPPER, e))),
            None => Ok(Vec::new()),
        }
    }
}

fn non_empty<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.port, 8787);
        assert_eq!(config.poll_interval(), Some(Duration::from_millis(400)));
        assert!(config.pepper_bytes().unwrap().is_empty());
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8787");
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_vars(&vars(&[
            (ENV_HOST, "0.0.0.0"),
            (ENV_PORT, "9000"),
            (ENV_DATABASE_PATH, "/tmp/investors.db"),
            (ENV_POLL_INTERVAL_MS, "0"),
            (ENV_PASSWORD_PEPPER, "c2VjcmV0"),
        ]))
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.database_path, PathBuf::from("/tmp/investors.db"));
        assert_eq!(config.poll_interval(), None);
        assert_eq!(config.pepper_bytes().unwrap(), b"secret".to_vec());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            AppConfig::from_vars(&vars(&[(ENV_PORT, "eighty")])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_vars(&vars(&[(ENV_PASSWORD_PEPPER, "not base64!")])),
            Err(AppError::Config(_))
        ));
    }
}
