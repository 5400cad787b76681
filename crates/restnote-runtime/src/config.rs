//! Runtime configuration loading.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_REDIRECT_HOPS: usize = 32;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Full runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub transport: TransportConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            transport: TransportConfig::default(),
        }
    }
}

/// Transport defaults applied when a request carries no override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Default request timeout in milliseconds; absent means no timeout.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub follow_redirects: bool,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            follow_redirects: true,
            max_redirects: default_max_redirects(),
            user_agent: None,
        }
    }
}

impl TransportConfig {
    /// Default timeout as a Duration.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Load runtime configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<RuntimeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate runtime configuration from YAML text.
pub fn parse_config(content: &str) -> Result<RuntimeConfig, ConfigError> {
    let config: RuntimeConfig = serde_yaml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &RuntimeConfig) -> Result<(), ConfigError> {
    if config.version == 0 {
        return Err(ConfigError::Invalid(
            "version must be greater than 0".to_string(),
        ));
    }

    if config.transport.timeout_ms == Some(0) {
        return Err(ConfigError::Invalid(
            "transport.timeout_ms must be > 0 when set".to_string(),
        ));
    }

    if config.transport.max_redirects > MAX_REDIRECT_HOPS {
        return Err(ConfigError::Invalid(format!(
            "transport.max_redirects must be <= {MAX_REDIRECT_HOPS}"
        )));
    }

    Ok(())
}

fn default_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_max_redirects() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gets_defaults() {
        let config = parse_config("{}").expect("config");
        assert_eq!(config.version, 1);
        assert!(config.transport.follow_redirects);
        assert_eq!(config.transport.max_redirects, 10);
        assert!(config.transport.timeout().is_none());
    }

    #[test]
    fn test_transport_section_overrides_defaults() {
        let config = parse_config(
            "version: 1\ntransport:\n  timeout_ms: 5000\n  follow_redirects: false\n  user_agent: restnote/0.1\n",
        )
        .expect("config");
        assert_eq!(config.transport.timeout(), Some(Duration::from_millis(5000)));
        assert!(!config.transport.follow_redirects);
        assert_eq!(config.transport.user_agent.as_deref(), Some("restnote/0.1"));
    }

    #[test]
    fn test_zero_version_is_rejected() {
        let err = parse_config("version: 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = parse_config("transport:\n  timeout_ms: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_excessive_redirect_limit_is_rejected() {
        let err = parse_config("transport:\n  max_redirects: 64\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
