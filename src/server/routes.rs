use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::info;

use crate::analysis::analyze_centrals;
use crate::error::AnalyticsError;
use crate::models::AnalysisResponse;
use crate::server::state::AppState;
use crate::wordpress::ContentRepository;

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "API running",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// GET /analytics/centrals-analysis
///
/// Runs a full analysis of every central. Missing WordPress settings are
/// reported before anything is fetched; the whole run is bounded by the
/// request budget.
pub async fn centrals_analysis<R>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<Response, AnalyticsError>
where
    R: ContentRepository + Send + Sync + 'static,
{
    let repository = state.repository()?;

    info!("Centrals analysis request");

    let report = tokio::time::timeout(state.request_budget, analyze_centrals(repository, None))
        .await
        .map_err(|_| AnalyticsError::BudgetExceeded(state.request_budget.as_secs()))??;

    Ok(Json(AnalysisResponse::new(&report)).into_response())
}
