//! Error types for the analytics pipeline.
//!
//! Malformed individual records never surface here: they are excluded
//! from the aggregates while parsing. Only failures that change the shape
//! of a response get a variant.

use thiserror::Error;

/// Errors produced while fetching and aggregating central data.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Required WordPress settings are absent. Aborts the whole request.
    #[error("WordPress configuration not found: missing {0}")]
    ConfigurationMissing(String),

    /// The content repository could not be reached or answered badly.
    #[error("Content repository request to {url} failed: {message}")]
    UpstreamUnavailable { url: String, message: String },

    /// The aggregator was handed a payload that is not a record sequence.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The whole analysis ran past the configured request budget.
    #[error("Analysis did not finish within {0}s")]
    BudgetExceeded(u64),

    /// The HTTP client itself could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl AnalyticsError {
    /// Build an upstream error from a reqwest failure, keeping the URL.
    pub fn upstream(url: &str, error: &reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            "cannot connect to host".to_string()
        } else if error.is_decode() {
            format!("unexpected response body: {}", error)
        } else {
            error.to_string()
        };

        AnalyticsError::UpstreamUnavailable {
            url: url.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_missing_message() {
        let err = AnalyticsError::ConfigurationMissing("WORDPRESS_EMAIL".to_string());
        assert_eq!(
            err.to_string(),
            "WordPress configuration not found: missing WORDPRESS_EMAIL"
        );
    }

    #[test]
    fn test_upstream_message_includes_url() {
        let err = AnalyticsError::UpstreamUnavailable {
            url: "https://example.org/wp-json/wp/v2/central".to_string(),
            message: "status 503".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("https://example.org/wp-json/wp/v2/central"));
        assert!(text.contains("status 503"));
    }
}
