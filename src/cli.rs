//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and environment fallbacks.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Centrals Analytics - volume verification metrics for composting centrals
///
/// Fetches every central and its volume verification posts from a WordPress
/// site and aggregates them into monthly, quarterly and semesterly volumes.
/// Runs once and writes a report, or serves the analysis over HTTP.
///
/// Examples:
///   centrals-analytics --site-url https://example.org --email me@example.org
///   centrals-analytics --format json --output centrals.json
///   centrals-analytics --serve --port 3000
///   centrals-analytics --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the WordPress site
    #[arg(long, value_name = "URL", env = "WORDPRESS_SITE_URL")]
    pub site_url: Option<String>,

    /// WordPress account used for Basic Auth
    #[arg(long, value_name = "EMAIL", env = "WORDPRESS_EMAIL")]
    pub email: Option<String>,

    /// WordPress application password
    #[arg(long, value_name = "PASSWORD", env = "WORDPRESS_PASS", hide_env_values = true)]
    pub password: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .centrals-analytics.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Serve the analysis over HTTP instead of writing a report
    #[arg(long)]
    pub serve: bool,

    /// Address to bind when serving
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to bind when serving
    #[arg(long, value_name = "PORT", env = "PORT")]
    pub port: Option<u16>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Leave the per-month tables out of the Markdown report
    #[arg(long)]
    pub no_monthly: bool,

    /// Timeout for each WordPress request, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Time allowed for a whole analysis, in seconds
    #[arg(long, value_name = "SECS")]
    pub budget: Option<u64>,

    /// Maximum result pages followed per WordPress listing
    #[arg(long, value_name = "COUNT")]
    pub max_pages: Option<u32>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .centrals-analytics.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        // A missing site URL is reported later as a configuration error.
        if let Some(ref url) = self.site_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Site URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.budget == Some(0) {
            return Err("Budget must be at least 1 second".to_string());
        }

        if self.max_pages == Some(0) {
            return Err("Max pages must be at least 1".to_string());
        }

        if !self.serve && self.host.is_some() {
            return Err("--host only applies together with --serve".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            site_url: Some("https://example.org".to_string()),
            email: Some("admin@example.org".to_string()),
            password: Some("secret".to_string()),
            config: None,
            serve: false,
            host: None,
            port: None,
            output: None,
            format: None,
            no_monthly: false,
            timeout: None,
            budget: None,
            max_pages: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_valid_args() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.site_url = Some("example.org".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_limits() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.max_pages = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_host_requires_serve() {
        let mut args = make_args();
        args.host = Some("127.0.0.1".to_string());
        assert!(args.validate().is_err());

        args.serve = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.site_url = Some("nope".to_string());
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_from_flags() {
        let args = Args::try_parse_from([
            "centrals-analytics",
            "--serve",
            "--port",
            "8080",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(args.serve);
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.format, Some(OutputFormat::Json));
    }
}
