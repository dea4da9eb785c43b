//! Centralized configuration management for paperdesk

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};
use reqwest::Url;

/// Path of the resources collection endpoint, relative to the base URL
pub const RESOURCES_PATH: &str = "/api/resources/";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the paper archive (scheme + host, optional prefix)
    pub base_url: String,
    /// Directory for downloaded papers
    pub download_dir: PathBuf,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "paperdesk/0.1.0".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            download_dir: "./downloads".into(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("PAPERDESK_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());

        let download_dir = std::env::var("PAPERDESK_DOWNLOAD_DIR")
            .unwrap_or_else(|_| "./downloads".to_string())
            .into();

        let http = HttpConfig {
            timeout_seconds: parse_env_var("PAPERDESK_HTTP_TIMEOUT_SECONDS")?.unwrap_or(30),
            user_agent: std::env::var("PAPERDESK_USER_AGENT")
                .unwrap_or_else(|_| "paperdesk/0.1.0".to_string()),
        };

        Ok(Config {
            base_url,
            download_dir,
            http,
        })
    }

    /// Override the base URL (from a CLI flag)
    pub fn with_base_url(mut self, base_url: Option<&str>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url.to_string();
        }
        self
    }

    /// Override the download directory (from a CLI flag)
    pub fn with_download_dir(mut self, dir: Option<&str>) -> Self {
        if let Some(dir) = dir {
            self.download_dir = dir.into();
        }
        self
    }

    /// Parsed base URL, always ending in a slash so joins keep any prefix
    pub fn base(&self) -> Result<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).with_context(|| format!("Invalid base URL: {}", self.base_url))
    }

    /// Full URL of the resources endpoint
    pub fn resources_url(&self) -> Result<Url> {
        let base = self.base()?;
        base.join(RESOURCES_PATH.trim_start_matches('/'))
            .with_context(|| format!("Cannot build resources URL from {}", self.base_url))
    }

    /// Get download directory as string
    pub fn download_dir_str(&self) -> &str {
        self.download_dir.to_str().unwrap_or("./downloads")
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.resources_url()?;

        std::fs::create_dir_all(&self.download_dir)
            .with_context(|| format!("Cannot create download directory: {}", self.download_dir.display()))?;

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.download_dir_str(), "./downloads");
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_resources_url_keeps_prefix() {
        let config = Config::default().with_base_url(Some("https://papers.example.edu/archive"));
        assert_eq!(
            config.resources_url().unwrap().as_str(),
            "https://papers.example.edu/archive/api/resources/"
        );

        let plain = Config::default().with_base_url(Some("http://localhost:8000/"));
        assert_eq!(
            plain.resources_url().unwrap().as_str(),
            "http://localhost:8000/api/resources/"
        );
    }

    #[test]
    fn test_config_validation() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("papers");
        let config = Config::default().with_download_dir(target.to_str());
        config.validate().unwrap();
        assert!(target.exists());

        let broken = Config::default().with_base_url(Some("not a url"));
        assert!(broken.validate().is_err());
    }
}
