use std::env;
use std::path::PathBuf;
use anyhow::{Result, Context};
use tracing::{info, warn};

/// Slack on top of the file ceiling for multipart framing and the `userId` field.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_file_size_mb: usize,
    pub upload_dir: PathBuf,
    pub metadata_dir: PathBuf,
    pub pdftotext_path: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            max_file_size_mb: 50,
            upload_dir: PathBuf::from("uploads"),
            metadata_dir: PathBuf::from("metadata"),
            pdftotext_path: "pdftotext".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        let defaults = Config::default();

        // PORT is what most hosting platforms inject; it wins over SERVER_PORT.
        let server_port = match env::var("PORT") {
            Ok(_) => Self::parse_env_var("PORT", defaults.server_port),
            Err(_) => Self::parse_env_var("SERVER_PORT", defaults.server_port),
        }
        .context("Failed to parse SERVER_PORT")?;

        let config = Config {
            server_host: Self::string_env_var("SERVER_HOST", &defaults.server_host),
            server_port,
            max_file_size_mb: Self::parse_env_var("MAX_FILE_SIZE_MB", defaults.max_file_size_mb)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            upload_dir: PathBuf::from(Self::string_env_var("UPLOAD_DIR", "uploads")),
            metadata_dir: PathBuf::from(Self::string_env_var("METADATA_DIR", "metadata")),
            pdftotext_path: Self::string_env_var("PDFTOTEXT_PATH", &defaults.pdftotext_path),
            log_format: Self::parse_env_var("LOG_FORMAT", defaults.log_format)
                .context("Failed to parse LOG_FORMAT")?,
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Request body ceiling: the file limit plus multipart framing.
    pub fn body_limit_bytes(&self) -> usize {
        self.max_file_size_bytes()
            .saturating_add(MULTIPART_OVERHEAD_BYTES)
    }

    fn string_env_var(var_name: &str, default: &str) -> String {
        env::var(var_name).unwrap_or_else(|_| {
            info!("{} not set, using default: {}", var_name, default);
            default.to_string()
        })
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self
            .max_file_size_mb
            .checked_mul(1024 * 1024)
            .and_then(|bytes| bytes.checked_add(MULTIPART_OVERHEAD_BYTES))
            .is_none()
        {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB is too large: {}",
                self.max_file_size_mb
            ));
        }
        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR must not be empty"));
        }
        if self.metadata_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("METADATA_DIR must not be empty"));
        }
        if self.pdftotext_path.trim().is_empty() {
            return Err(anyhow::anyhow!("PDFTOTEXT_PATH must not be empty"));
        }
        Ok(())
    }
}
