//! Process configuration, read once at start-up.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_PDF_FOLDER: &str = "generated_pdfs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a valid port number, got '{0}'")]
    InvalidPort(String),
    #[error("PDF_FOLDER must not be empty")]
    EmptyOutputDir,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding one `<numero>.pdf` per generated quote.
    pub output_dir: PathBuf,
    /// Prefix for `pdf_url` in responses. Empty means relative links.
    pub public_base_url: String,
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            output_dir: PathBuf::from(DEFAULT_PDF_FOLDER),
            public_base_url: String::new(),
            allowed_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => defaults.port,
        };

        let output_dir = match lookup("PDF_FOLDER") {
            Some(raw) if raw.trim().is_empty() => return Err(ConfigError::EmptyOutputDir),
            Some(raw) => PathBuf::from(raw.trim()),
            None => defaults.output_dir,
        };

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_default();

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            output_dir,
            public_base_url,
            allowed_origins,
        })
    }

    /// Public link under which a generated file can be downloaded.
    pub fn download_url(&self, filename: &str) -> String {
        format!("{}/download/{}", self.public_base_url, filename)
    }
}
