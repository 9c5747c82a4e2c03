//! REST client for the WordPress `wp/v2` API.

use crate::analysis::metrics::parse_records;
use crate::config::{HttpConfig, WordPressConfig, WordPressCredentials};
use crate::error::AnalyticsError;
use crate::models::{Central, VolumeRecord};
use crate::wordpress::ContentRepository;
use reqwest::header::{HeaderMap, ACCEPT};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Header carrying the page count of a WordPress collection.
const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// Longest slice of an error body kept in messages.
const MAX_ERROR_BODY: usize = 200;

/// Authenticated WordPress REST client.
#[derive(Debug, Clone)]
pub struct WordPressClient {
    http_client: reqwest::Client,
    credentials: WordPressCredentials,
    centrals_type: String,
    records_type: String,
    per_page: u32,
    max_pages: u32,
}

impl WordPressClient {
    /// Create a client for the given site.
    pub fn new(
        credentials: WordPressCredentials,
        wordpress: &WordPressConfig,
        http: &HttpConfig,
    ) -> Result<Self, AnalyticsError> {
        info!("Initializing WordPress client for {}", credentials.site_url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(http.timeout_seconds))
            .user_agent(concat!("centrals-analytics/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AnalyticsError::HttpClient)?;

        Ok(Self {
            http_client,
            credentials,
            centrals_type: wordpress.centrals_type.clone(),
            records_type: wordpress.records_type.clone(),
            per_page: wordpress.per_page.clamp(1, 100),
            max_pages: wordpress.max_pages.max(1),
        })
    }

    /// Base URL of the site this client talks to.
    pub fn site_url(&self) -> &str {
        &self.credentials.site_url
    }

    fn endpoint(&self, post_type: &str) -> String {
        format!("{}/wp-json/wp/v2/{}", self.credentials.site_url, post_type)
    }

    /// Fetch one page of a collection. Returns the body and the page count.
    async fn fetch_page(
        &self,
        url: &str,
        search: Option<&str>,
        page: u32,
    ) -> Result<(Value, u32), AnalyticsError> {
        let mut query = vec![("per_page", self.per_page.to_string())];
        if let Some(term) = search {
            query.push(("search", term.to_string()));
        }
        if page > 1 {
            query.push(("page", page.to_string()));
        }

        debug!("GET {} page {}", url, page);

        let response = self
            .http_client
            .get(url)
            .basic_auth(&self.credentials.email, Some(&self.credentials.password))
            .header(ACCEPT, "application/json")
            .query(&query)
            .send()
            .await
            .map_err(|e| AnalyticsError::upstream(url, &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyticsError::UpstreamUnavailable {
                url: url.to_string(),
                message: format!("status {}: {}", status, truncate(&body, MAX_ERROR_BODY)),
            });
        }

        let pages = total_pages(response.headers());
        let body: Value = response
            .json()
            .await
            .map_err(|e| AnalyticsError::upstream(url, &e))?;

        Ok((body, pages))
    }

    /// Fetch a collection, following pagination up to `max_pages`.
    ///
    /// A page that is not an array is returned as-is so callers can reject it.
    async fn fetch_collection(
        &self,
        post_type: &str,
        search: Option<&str>,
    ) -> Result<Value, AnalyticsError> {
        let url = self.endpoint(post_type);
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let (body, total) = self.fetch_page(&url, search, page).await?;
            let Value::Array(batch) = body else {
                return Ok(body);
            };

            let exhausted = batch.is_empty();
            items.extend(batch);

            if exhausted || page >= total {
                break;
            }
            if page >= self.max_pages {
                warn!(
                    "{} has {} pages, stopping after {} (max_pages)",
                    url, total, self.max_pages
                );
                break;
            }
            page += 1;
        }

        Ok(Value::Array(items))
    }
}

impl ContentRepository for WordPressClient {
    async fn list_centrals(&self) -> Result<Vec<Central>, AnalyticsError> {
        let body = self.fetch_collection(&self.centrals_type, None).await?;

        serde_json::from_value(body).map_err(|e| AnalyticsError::UpstreamUnavailable {
            url: self.endpoint(&self.centrals_type),
            message: format!("unexpected centrals payload: {}", e),
        })
    }

    async fn search_volume_records(
        &self,
        central_name: &str,
    ) -> Result<Vec<VolumeRecord>, AnalyticsError> {
        let body = self
            .fetch_collection(&self.records_type, Some(central_name))
            .await?;

        parse_records(body)
    }
}

/// Page count announced by WordPress; 1 when absent or garbled.
fn total_pages(headers: &HeaderMap) -> u32 {
    headers
        .get(TOTAL_PAGES_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(1)
        .max(1)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
