//! Data models for the centrals analytics.
//!
//! This module contains the raw WordPress shapes consumed from the content
//! repository and the computed report structures returned to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title of a WordPress post, either rendered or plain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostTitle {
    /// `{"rendered": "..."}` as returned by the REST API.
    Rendered { rendered: String },
    /// A bare string title.
    Plain(String),
}

/// A collection site as listed by the content repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Central {
    /// WordPress post identifier.
    #[serde(default)]
    pub id: u64,
    /// URL slug of the central.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Plain name, used when no title is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Post title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<PostTitle>,
}

impl Central {
    /// Display name: rendered title, then name, then plain title.
    pub fn display_name(&self) -> &str {
        if let Some(PostTitle::Rendered { rendered }) = &self.title {
            if !rendered.is_empty() {
                return rendered;
            }
        }
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name;
        }
        match &self.title {
            Some(PostTitle::Plain(title)) => title,
            _ => "",
        }
    }
}

/// Metadata block of a volume verification post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Measured volume; string or number in the wild.
    #[serde(default)]
    pub volume: Option<Value>,
}

/// A single volume verification post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeRecord {
    #[serde(default)]
    pub id: Option<u64>,
    /// Post date as sent by WordPress.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub meta: Option<RecordMeta>,
}

impl VolumeRecord {
    /// The raw volume value, if any.
    pub fn raw_volume(&self) -> Option<&Value> {
        self.meta.as_ref().and_then(|m| m.volume.as_ref())
    }
}

/// Identity of a central, passed through to every output untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralInfo {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl From<&Central> for CentralInfo {
    fn from(central: &Central) -> Self {
        Self {
            id: central.id,
            name: central.display_name().to_string(),
            slug: central.slug.clone(),
        }
    }
}

/// Volume of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyVolume {
    /// `YYYY-MM`
    pub month: String,
    pub volume: f64,
}

/// Volume of one quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyVolume {
    /// `YYYY-Qn`
    pub quarter: String,
    pub volume: f64,
}

/// Volume of one semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterlyVolume {
    /// `YYYY-Sn`
    pub semester: String,
    pub volume: f64,
}

/// Aggregated metrics of a single central.
///
/// All volume figures are rounded to two decimals at output time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentralMetrics {
    pub total_volume: f64,
    pub average_volume: f64,
    pub post_count: usize,
    pub average_monthly_volume: f64,
    pub average_monthly_posts: f64,
    /// Every month between the first and last record, gaps filled with zero.
    pub monthly_volumes: Vec<MonthlyVolume>,
    /// Only quarters that received at least one record.
    pub quarterly_volumes: Vec<QuarterlyVolume>,
    /// Only semesters that received at least one record.
    pub semesterly_volumes: Vec<SemesterlyVolume>,
}

/// Metrics of one central together with its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralReport {
    pub central: CentralInfo,
    pub metrics: CentralMetrics,
    /// Set when fetching or aggregating this central failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CentralReport {
    /// A zero-valued entry annotated with the failure message.
    pub fn failed(central: &Central, error: String) -> Self {
        Self {
            central: CentralInfo::from(central),
            metrics: CentralMetrics::default(),
            error: Some(error),
        }
    }

    /// Whether this entry stands in for a failed central.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Cross-central totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_centrals: usize,
    pub total_volume: f64,
    pub total_posts: usize,
    pub average_volume_per_central: f64,
}

/// The complete analysis of every central.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Centrals sorted by total volume, highest first.
    pub centrals: Vec<CentralReport>,
    pub summary: AnalysisSummary,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Number of centrals whose data could not be fetched.
    pub fn failed_count(&self) -> usize {
        self.centrals.iter().filter(|c| c.is_failed()).count()
    }
}

/// Success envelope shared by the HTTP surface and the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse<'a> {
    pub success: bool,
    pub data: &'a AnalysisReport,
}

impl<'a> AnalysisResponse<'a> {
    pub fn new(data: &'a AnalysisReport) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_central_display_name_prefers_rendered_title() {
        let central: Central = serde_json::from_value(json!({
            "id": 7,
            "slug": "central-norte",
            "name": "ignored",
            "title": { "rendered": "Central Norte" }
        }))
        .unwrap();

        assert_eq!(central.display_name(), "Central Norte");
    }

    #[test]
    fn test_central_display_name_fallbacks() {
        let by_name: Central = serde_json::from_value(json!({
            "id": 1,
            "name": "Central Sul"
        }))
        .unwrap();
        assert_eq!(by_name.display_name(), "Central Sul");

        let by_plain_title: Central = serde_json::from_value(json!({
            "id": 2,
            "title": "Central Leste"
        }))
        .unwrap();
        assert_eq!(by_plain_title.display_name(), "Central Leste");

        let anonymous: Central = serde_json::from_value(json!({ "id": 3 })).unwrap();
        assert_eq!(anonymous.display_name(), "");
    }

    #[test]
    fn test_volume_record_tolerates_missing_fields() {
        let record: VolumeRecord = serde_json::from_value(json!({ "id": 10 })).unwrap();
        assert_eq!(record.date, None);
        assert!(record.raw_volume().is_none());

        let record: VolumeRecord = serde_json::from_value(json!({
            "date": "2024-01-15T10:00:00",
            "meta": { "volume": 12.5 }
        }))
        .unwrap();
        assert_eq!(record.raw_volume(), Some(&json!(12.5)));
    }

    #[test]
    fn test_metrics_serialize_camel_case() {
        let metrics = CentralMetrics::default();
        let value = serde_json::to_value(&metrics).unwrap();

        assert!(value.get("totalVolume").is_some());
        assert!(value.get("averageMonthlyPosts").is_some());
        assert!(value.get("semesterlyVolumes").is_some());
    }

    #[test]
    fn test_failed_report_keeps_identity() {
        let central = Central {
            id: 42,
            slug: Some("central-oeste".to_string()),
            name: Some("Central Oeste".to_string()),
            title: None,
        };

        let report = CentralReport::failed(&central, "boom".to_string());
        assert!(report.is_failed());
        assert_eq!(report.central.id, 42);
        assert_eq!(report.central.name, "Central Oeste");
        assert_eq!(report.metrics.post_count, 0);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["error"], "boom");
    }
}
