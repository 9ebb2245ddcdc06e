/// Configuration module for the Storage Gateway
///
/// Everything is read from the process environment once at startup. A `.env`
/// file is honoured when present. Missing storage credentials are fatal.

use anyhow::{bail, Context, Result};
use shared::observability::{LogConfig, LogFormat, LogLevel};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Hard cap on the size of an upload request body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Main configuration structure for the Storage Gateway
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let config = Self {
            server: ServerConfig::from_lookup(&lookup)?,
            storage: StorageConfig::from_lookup(&lookup)?,
            logging: LoggingConfig::from_lookup(&lookup)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("SERVER_PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("Invalid SERVER_PORT")?,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("Server port cannot be 0");
        }
        Ok(())
    }
}

/// Object storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub access_key: String,
    pub secret_key: String,
    /// Backend address as `host:port`, optionally with a scheme.
    pub endpoint: String,
    pub use_ssl: bool,
    pub region: String,
    pub operation_timeout: Duration,
}

impl StorageConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let access_key = lookup("ACCESS_KEY");
        let secret_key = lookup("SECRET_KEY");
        let endpoint = lookup("S3_ENDPOINT");

        let (access_key, secret_key, endpoint) = match (access_key, secret_key, endpoint) {
            (Some(access_key), Some(secret_key), Some(endpoint)) => {
                (access_key, secret_key, endpoint)
            }
            _ => bail!(
                "Missing required environment variables: ACCESS_KEY, SECRET_KEY, or S3_ENDPOINT"
            ),
        };

        let timeout_secs: u64 = lookup("STORAGE_OPERATION_TIMEOUT_SECS")
            .unwrap_or_else(|| "300".to_string())
            .parse()
            .context("Invalid STORAGE_OPERATION_TIMEOUT_SECS")?;

        Ok(Self {
            access_key,
            secret_key,
            endpoint,
            use_ssl: lookup("S3_USE_SSL")
                .map(|v| v.parse::<bool>())
                .transpose()
                .context("Invalid S3_USE_SSL")?
                .unwrap_or(false),
            region: lookup("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            operation_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Full endpoint URL handed to the S3 SDK
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
            self.endpoint.clone()
        } else if self.use_ssl {
            format!("https://{}", self.endpoint)
        } else {
            format!("http://{}", self.endpoint)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.operation_timeout.is_zero() {
            bail!("STORAGE_OPERATION_TIMEOUT_SECS must be at least 1");
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl LoggingConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            level: lookup("LOG_LEVEL")
                .map(|v| v.parse::<LogLevel>())
                .transpose()?
                .unwrap_or(LogLevel::Info),
            format: lookup("LOG_FORMAT")
                .map(|v| v.parse::<LogFormat>())
                .transpose()?
                .unwrap_or(LogFormat::Pretty),
        })
    }

    pub fn to_log_config(&self, service_name: &str) -> LogConfig {
        LogConfig {
            level: self.level,
            format: self.format,
            service_name: service_name.to_string(),
            ..Default::default()
        }
    }
}
