use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::error;

use crate::error::AnalyticsError;

impl AnalyticsError {
    /// HTTP status and short label used in failure envelopes.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            AnalyticsError::ConfigurationMissing(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "WordPress configuration not found",
            ),
            AnalyticsError::BudgetExceeded(_) => {
                (StatusCode::GATEWAY_TIMEOUT, "Analysis timed out")
            }
            AnalyticsError::UpstreamUnavailable { .. }
            | AnalyticsError::InvalidInput(_)
            | AnalyticsError::HttpClient(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

/// Renders as `{"success": false, "error": ..., "message": ...}`.
impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let (status, label) = self.status();
        error!("Centrals analysis failed: {}", self);

        (
            status,
            Json(json!({
                "success": false,
                "error": label,
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let missing = AnalyticsError::ConfigurationMissing("WORDPRESS_PASS".to_string());
        assert_eq!(missing.status().0, StatusCode::INTERNAL_SERVER_ERROR);

        let upstream = AnalyticsError::UpstreamUnavailable {
            url: "https://example.org".to_string(),
            message: "status 503".to_string(),
        };
        assert_eq!(upstream.status().1, "Internal server error");

        let budget = AnalyticsError::BudgetExceeded(300);
        assert_eq!(budget.status().0, StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_into_response_status() {
        let response = AnalyticsError::BudgetExceeded(5).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
