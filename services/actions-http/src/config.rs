use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionsConfig {
    /// Listen host address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Timeout for each outbound CRM call in seconds
    pub crm_timeout_secs: u64,

    /// Maximum body size in bytes
    pub max_body_size_bytes: usize,

    /// Log level
    pub log_level: String,

    /// Log output format
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}", s),
        }
    }
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            crm_timeout_secs: 10,
            max_body_size_bytes: 1024 * 1024,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
        }
    }
}

impl ActionsConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("ACTIONS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("Invalid PORT")?;

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("Invalid REQUEST_TIMEOUT_SECS")?;

        let crm_timeout_secs = std::env::var("CRM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("Invalid CRM_TIMEOUT_SECS")?;

        let max_body_size_bytes = std::env::var("MAX_BODY_SIZE_BYTES")
            .unwrap_or_else(|_| "1048576".to_string()) // 1MB
            .parse()
            .context("Invalid MAX_BODY_SIZE_BYTES")?;

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "compact".to_string())
            .parse()?;

        Ok(Self {
            host,
            port,
            request_timeout_secs,
            crm_timeout_secs,
            max_body_size_bytes,
            log_level,
            log_format,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            anyhow::bail!("ACTIONS_HOST cannot be empty");
        }

        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than 0");
        }

        if self.crm_timeout_secs == 0 {
            anyhow::bail!("CRM_TIMEOUT_SECS must be greater than 0");
        }

        // CRM calls must time out before the request does
        if self.crm_timeout_secs >= self.request_timeout_secs {
            anyhow::bail!("CRM_TIMEOUT_SECS must be less than REQUEST_TIMEOUT_SECS");
        }

        if self.max_body_size_bytes == 0 {
            anyhow::bail!("MAX_BODY_SIZE_BYTES must be greater than 0");
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn crm_timeout(&self) -> Duration {
        Duration::from_secs(self.crm_timeout_secs)
    }

    /// Get the listen address
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
