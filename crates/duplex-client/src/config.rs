//! Client configuration, loaded from TOML.
//!
//! ```toml
//! base_url = "https://platform.example.com"
//! api_token = "..."          # or set DUPLEX_API_TOKEN
//! timeout_secs = 30
//! accept_invalid_certs = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Environment variable consulted when the config file omits `api_token`.
pub const API_TOKEN_ENV: &str = "DUPLEX_API_TOKEN";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the control plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the control plane, e.g. `https://platform.example.com`.
    pub base_url: String,
    /// API token sent with every request.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Accept self-signed certificates. Control planes are commonly
    /// deployed behind self-signed TLS.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    /// Create a config with defaults for everything but the endpoint
    /// and token.
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: Some(api_token.into()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accept_invalid_certs: false,
        }
    }

    /// Load from a TOML file, falling back to `DUPLEX_API_TOKEN` for the
    /// token. Fails if no token is available from either source.
    pub fn from_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::InvalidConfig(format!("{}: {e}", path.display())))?;
        let mut config: ClientConfig = toml::from_str(&content)
            .map_err(|e| ClientError::InvalidConfig(format!("{}: {e}", path.display())))?;

        if config.api_token.is_none() {
            config.api_token = std::env::var(API_TOKEN_ENV).ok().filter(|t| !t.is_empty());
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that the config is complete enough to connect with.
    pub fn validate(&self) -> ClientResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::InvalidConfig("base_url is empty".to_string()));
        }
        if self.token().is_none() {
            return Err(ClientError::InvalidConfig(format!(
                "no api_token in config and {API_TOKEN_ENV} is unset"
            )));
        }
        Ok(())
    }

    /// The effective API token, if any.
    pub fn token(&self) -> Option<&str> {
        self.api_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Base URL without a trailing slash.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
base_url = "https://platform.example.com/"
api_token = "secret"
timeout_secs = 10
accept_invalid_certs = true
"#;
        let config: ClientConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.trimmed_base_url(), "https://platform.example.com");
        assert_eq!(config.token(), Some("secret"));
        assert_eq!(config.timeout_secs, 10);
        assert!(config.accept_invalid_certs);
    }

    #[test]
    fn defaults_applied() {
        let config: ClientConfig =
            toml::from_str(r#"base_url = "http://localhost:9000""#).unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.accept_invalid_certs);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn validate_rejects_missing_token() {
        let config: ClientConfig =
            toml::from_str(r#"base_url = "http://localhost:9000""#).unwrap();
        // Only meaningful when the env var is not set in the test run.
        if std::env::var(API_TOKEN_ENV).is_err() {
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn from_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"http://localhost:9000\"").unwrap();
        writeln!(file, "api_token = \"t0ken\"").unwrap();
        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.token(), Some("t0ken"));
    }
}
