// src/config.rs
//! Layered client configuration: defaults, optional YAML file, environment

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::core::service_client::DEFAULT_CVS_PREFIX;

pub const DEFAULT_API_BASE_URL: &str = "https://ai-cv-analyser-five.vercel.app";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_CONFIG_FILE: &str = "cv_analyzer.yaml";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Section of the config file that was selected (`local` or `production`)
    pub environment: String,
    pub api_base_url: String,
    /// Prepended to the action routes (`/upload`, `/score`, ...)
    pub route_prefix: String,
    /// Prepended to the CV collection (`/cvs`)
    pub cvs_prefix: String,
    pub max_upload_bytes: u64,
    /// `None` leaves hang behavior to the transport
    pub request_timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct FileSection {
    api_base_url: Option<String>,
    route_prefix: Option<String>,
    cvs_prefix: Option<String>,
    max_upload_bytes: Option<u64>,
    request_timeout_secs: Option<u64>,
    log_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: FileSection,
    #[serde(default)]
    production: FileSection,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            environment: "local".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            route_prefix: String::new(),
            cvs_prefix: DEFAULT_CVS_PREFIX.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout_secs: None,
            log_file: None,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from the process environment and the optional config file
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();

        let explicit_path = std::env::var("CV_ANALYZER_CONFIG").ok().map(PathBuf::from);
        let config_path = explicit_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let file_content = if config_path.exists() {
            Some(
                std::fs::read_to_string(&config_path).with_context(|| {
                    format!("Failed to read {}", config_path.display())
                })?,
            )
        } else if explicit_path.is_some() {
            anyhow::bail!("Config file not found: {}", config_path.display());
        } else {
            None
        };

        Self::from_sources(file_content.as_deref(), &environment, |key| {
            std::env::var(key).ok()
        })
    }

    /// Build from explicit sources; environment lookups win over the file
    pub fn from_sources<F>(file_content: Option<&str>, environment: &str, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            environment: environment.to_string(),
            ..Self::default()
        };

        if let Some(content) = file_content {
            let file: ConfigFile =
                serde_yaml::from_str(content).context("Failed to parse config file")?;
            let section = match environment {
                "production" => file.production,
                _ => file.local,
            };
            config.apply_section(section);
        }

        if let Some(url) = env("CV_ANALYZER_API_URL") {
            config.api_base_url = url;
        }
        if let Some(prefix) = env("CV_ANALYZER_ROUTE_PREFIX") {
            config.route_prefix = prefix;
        }
        if let Some(prefix) = env("CV_ANALYZER_CVS_PREFIX") {
            config.cvs_prefix = prefix;
        }
        if let Some(max) = env("CV_ANALYZER_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = max
                .parse::<u64>()
                .context("CV_ANALYZER_MAX_UPLOAD_BYTES must be a number of bytes")?;
        }
        if let Some(timeout) = env("CV_ANALYZER_TIMEOUT_SECS") {
            config.request_timeout_secs = Some(
                timeout
                    .parse::<u64>()
                    .context("CV_ANALYZER_TIMEOUT_SECS must be a number of seconds")?,
            );
        }
        if let Some(log_file) = env("CV_ANALYZER_LOG_FILE") {
            config.log_file = Some(PathBuf::from(log_file));
        }

        config.normalize()
    }

    pub fn with_api_base_url(mut self, url: String) -> Self {
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn apply_section(&mut self, section: FileSection) {
        if let Some(url) = section.api_base_url {
            self.api_base_url = url;
        }
        if let Some(prefix) = section.route_prefix {
            self.route_prefix = prefix;
        }
        if let Some(prefix) = section.cvs_prefix {
            self.cvs_prefix = prefix;
        }
        if let Some(max) = section.max_upload_bytes {
            self.max_upload_bytes = max;
        }
        if section.request_timeout_secs.is_some() {
            self.request_timeout_secs = section.request_timeout_secs;
        }
        if section.log_file.is_some() {
            self.log_file = section.log_file;
        }
    }

    fn normalize(mut self) -> Result<Self> {
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            anyhow::bail!(
                "API base URL must start with http:// or https://: {}",
                self.api_base_url
            );
        }

        self.route_prefix = normalize_prefix(&self.route_prefix);
        self.cvs_prefix = normalize_prefix(&self.cvs_prefix);

        if self.max_upload_bytes == 0 {
            anyhow::bail!("max_upload_bytes must be greater than zero");
        }

        Ok(self)
    }

    fn get_environment() -> String {
        std::env::var("CV_ANALYZER_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }
}

/// `api/` and `/api` both become `/api`; blank becomes empty
fn normalize_prefix(prefix: &str) -> String {
    let prefix = prefix.trim().trim_matches('/');
    if prefix.is_empty() {
        String::new()
    } else {
        format!("/{}", prefix)
    }
}
