//! Configuration types for the HTTP service

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ConfigError;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound CMP API and OAuth settings
    #[serde(default)]
    pub cmp: CmpSettings,

    /// Preview URL settings
    #[serde(default)]
    pub preview: PreviewSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Validate required settings.
    ///
    /// The CMP and preview settings carry no usable defaults; an empty value
    /// means the deployment is not configured and startup must abort before
    /// the first webhook arrives.
    pub fn validate(&self) -> Result<(), ConfigError> {
        required_url(&self.cmp.api_base_url, "cmp.api_base_url")?;
        required_url(&self.cmp.auth_base_url, "cmp.auth_base_url")?;
        required(&self.cmp.client_id, "cmp.client_id")?;
        required(&self.cmp.client_secret, "cmp.client_secret")?;
        required_url(&self.preview.base_url, "preview.base_url")?;

        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                message: "server.port must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            timeout_seconds: 30,
            shutdown_timeout_seconds: 30,
        }
    }
}

/// Settings for the outbound CMP integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmpSettings {
    /// CMP structured-content API base URL
    pub api_base_url: String,

    /// OAuth authorization-server base URL
    pub auth_base_url: String,

    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Timeout for outbound CMP calls in seconds
    pub timeout_seconds: u64,
}

impl Default for CmpSettings {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            auth_base_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            timeout_seconds: 30,
        }
    }
}

/// Settings for preview URL generation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PreviewSettings {
    /// Base URL the per-channel preview URLs are built from
    pub base_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

fn required(value: &str, key: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing {
            key: key.to_string(),
        });
    }
    Ok(())
}

fn required_url(value: &str, key: &str) -> Result<(), ConfigError> {
    required(value, key)?;
    Url::parse(value).map_err(|e| ConfigError::Invalid {
        message: format!("{} is not a valid URL: {}", key, e),
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
