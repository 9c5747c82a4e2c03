use std::time::Duration;

use tracing::warn;

use crate::config::Config;
use crate::error::AnalyticsError;
use crate::wordpress::{ContentRepository, WordPressClient};

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState<R = WordPressClient> {
    /// Content repository, absent when WordPress settings are missing.
    pub repository: Option<R>,

    /// Settings that kept the repository from being built.
    pub missing_settings: Vec<&'static str>,

    /// Time allowed for one whole analysis.
    pub request_budget: Duration,
}

impl AppState<WordPressClient> {
    /// Build the state from configuration.
    ///
    /// Missing WordPress settings do not prevent startup; the analysis
    /// endpoint reports them on every request instead.
    pub fn from_config(config: &Config) -> Result<Self, AnalyticsError> {
        let request_budget = Duration::from_secs(config.http.request_budget_seconds);

        match config.wordpress.credentials() {
            Ok(credentials) => {
                let client = WordPressClient::new(credentials, &config.wordpress, &config.http)?;
                Ok(Self::new(client, request_budget))
            }
            Err(AnalyticsError::ConfigurationMissing(missing)) => {
                warn!("WordPress configuration incomplete, missing {}", missing);
                Ok(Self {
                    repository: None,
                    missing_settings: config.wordpress.missing_settings(),
                    request_budget,
                })
            }
            Err(e) => Err(e),
        }
    }
}

impl<R: ContentRepository> AppState<R> {
    pub fn new(repository: R, request_budget: Duration) -> Self {
        Self {
            repository: Some(repository),
            missing_settings: Vec::new(),
            request_budget,
        }
    }

    /// The repository, or the configuration error to answer with.
    pub fn repository(&self) -> Result<&R, AnalyticsError> {
        self.repository
            .as_ref()
            .ok_or_else(|| AnalyticsError::ConfigurationMissing(self.missing_settings.join(", ")))
    }
}
