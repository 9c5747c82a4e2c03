//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.centrals-analytics.toml` files and command-line/environment values.

use crate::cli::OutputFormat;
use crate::error::AnalyticsError;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = ".centrals-analytics.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// WordPress content repository settings.
    #[serde(default)]
    pub wordpress: WordPressConfig,

    /// Outgoing HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// WordPress site and post type settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct WordPressConfig {
    /// Base URL of the WordPress site.
    #[serde(default)]
    pub site_url: Option<String>,

    /// Account used for Basic Auth.
    #[serde(default)]
    pub email: Option<String>,

    /// Application password for Basic Auth.
    #[serde(default)]
    pub password: Option<String>,

    /// REST base of the centrals post type.
    #[serde(default = "default_centrals_type")]
    pub centrals_type: String,

    /// REST base of the volume verification post type.
    #[serde(default = "default_records_type")]
    pub records_type: String,

    /// Items requested per page (WordPress caps this at 100).
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Maximum pages followed per listing.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for WordPressConfig {
    fn default() -> Self {
        Self {
            site_url: None,
            email: None,
            password: None,
            centrals_type: default_centrals_type(),
            records_type: default_records_type(),
            per_page: default_per_page(),
            max_pages: default_max_pages(),
        }
    }
}

impl fmt::Debug for WordPressConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordPressConfig")
            .field("site_url", &self.site_url)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("centrals_type", &self.centrals_type)
            .field("records_type", &self.records_type)
            .field("per_page", &self.per_page)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

fn default_centrals_type() -> String {
    "central".to_string()
}

fn default_records_type() -> String {
    "verificacoes-de-volu".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    10
}

/// Validated WordPress access settings.
#[derive(Clone)]
pub struct WordPressCredentials {
    pub site_url: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for WordPressCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordPressCredentials")
            .field("site_url", &self.site_url)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl WordPressConfig {
    /// Names of the required settings that are absent or blank.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.site_url) {
            missing.push("WORDPRESS_SITE_URL");
        }
        if blank(&self.email) {
            missing.push("WORDPRESS_EMAIL");
        }
        if blank(&self.password) {
            missing.push("WORDPRESS_PASS");
        }
        missing
    }

    /// Resolve the credentials, failing if any of them is missing.
    pub fn credentials(&self) -> Result<WordPressCredentials, AnalyticsError> {
        match (&self.site_url, &self.email, &self.password) {
            (Some(site_url), Some(email), Some(password)) if self.missing_settings().is_empty() => {
                Ok(WordPressCredentials {
                    site_url: site_url.trim().trim_end_matches('/').to_string(),
                    email: email.trim().to_string(),
                    password: password.clone(),
                })
            }
            _ => Err(AnalyticsError::ConfigurationMissing(
                self.missing_settings().join(", "),
            )),
        }
    }
}

/// Outgoing request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for each request to WordPress, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Time allowed for one whole analysis, in seconds.
    #[serde(default = "default_request_budget")]
    pub request_budget_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            request_budget_seconds: default_request_budget(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_request_budget() -> u64 {
    300
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl ServerConfig {
    /// `host:port` to bind to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Include the per-month table of every central.
    #[serde(default = "default_true")]
    pub include_monthly_tables: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: OutputFormat::default(),
            include_monthly_tables: true,
        }
    }
}

fn default_output() -> String {
    "centrals_report.md".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Values given on the command line or through the environment take
    /// precedence over the config file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref site_url) = args.site_url {
            self.wordpress.site_url = Some(site_url.clone());
        }
        if let Some(ref email) = args.email {
            self.wordpress.email = Some(email.clone());
        }
        if let Some(ref password) = args.password {
            self.wordpress.password = Some(password.clone());
        }
        if let Some(max_pages) = args.max_pages {
            self.wordpress.max_pages = max_pages;
        }

        if let Some(timeout) = args.timeout {
            self.http.timeout_seconds = timeout;
        }
        if let Some(budget) = args.budget {
            self.http.request_budget_seconds = budget;
        }

        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref output) = args.output {
            self.report.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if args.no_monthly {
            self.report.include_monthly_tables = false;
        }
    }

    /// Reject limits that would make every request fail.
    ///
    /// Runs on the merged configuration, so values coming from the file
    /// are held to the same bounds as the command-line flags.
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_seconds == 0 {
            bail!("http.timeout_seconds must be at least 1");
        }
        if self.http.request_budget_seconds == 0 {
            bail!("http.request_budget_seconds must be at least 1");
        }
        if self.wordpress.max_pages == 0 {
            bail!("wordpress.max_pages must be at least 1");
        }
        if self.wordpress.per_page == 0 {
            bail!("wordpress.per_page must be at least 1");
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
