//! Cross-central aggregation.
//!
//! This module drives the per-central fetch-then-aggregate loop and computes
//! the summary over every central.

use crate::analysis::metrics::{compute_metrics, round2};
use crate::error::AnalyticsError;
use crate::models::{AnalysisReport, AnalysisSummary, CentralReport};
use crate::wordpress::ContentRepository;
use chrono::Utc;
use indicatif::ProgressBar;
use tracing::{error, info};

/// Analyze every central known to the repository.
///
/// Centrals are processed one at a time. A failure while fetching one
/// central's records yields a zeroed entry carrying the error instead of
/// aborting the batch; only a failure to list the centrals is fatal.
pub async fn analyze_centrals<R: ContentRepository>(
    repo: &R,
    progress: Option<&ProgressBar>,
) -> Result<AnalysisReport, AnalyticsError> {
    info!("Starting centrals analysis");

    let centrals = repo.list_centrals().await?;
    info!("Found {} centrals", centrals.len());

    if let Some(pb) = progress {
        pb.set_length(centrals.len() as u64);
    }

    let mut reports = Vec::with_capacity(centrals.len());

    for central in &centrals {
        let name = central.display_name();
        if let Some(pb) = progress {
            pb.set_message(name.to_string());
        }
        info!("Processing central: {}", name);

        let report = match repo.search_volume_records(name).await {
            Ok(records) => {
                info!("Found {} verifications for {}", records.len(), name);
                compute_metrics(central, &records)
            }
            Err(e) => {
                error!("Failed to process central {}: {}", name, e);
                CentralReport::failed(central, e.to_string())
            }
        };
        reports.push(report);

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    sort_by_total_volume(&mut reports);
    let summary = summarize(&reports);

    info!(
        "Centrals analysis complete: {} centrals, {} failed",
        summary.total_centrals,
        reports.iter().filter(|r| r.is_failed()).count()
    );

    Ok(AnalysisReport {
        centrals: reports,
        summary,
        generated_at: Utc::now(),
    })
}

/// Sort reports by total volume, highest first. Ties keep their order.
pub fn sort_by_total_volume(reports: &mut [CentralReport]) {
    reports.sort_by(|a, b| b.metrics.total_volume.total_cmp(&a.metrics.total_volume));
}

/// Compute the summary over every report, failed ones included.
pub fn summarize(reports: &[CentralReport]) -> AnalysisSummary {
    let total_centrals = reports.len();
    let total_volume: f64 = reports.iter().map(|r| r.metrics.total_volume).sum();
    let total_posts = reports.iter().map(|r| r.metrics.post_count).sum();

    let average_volume_per_central = if total_centrals > 0 {
        total_volume / total_centrals as f64
    } else {
        0.0
    };

    AnalysisSummary {
        total_centrals,
        total_volume: round2(total_volume),
        total_posts,
        average_volume_per_central: round2(average_volume_per_central),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordpress::fake::{central, FakeRepository};

    #[test]
    fn test_analyze_sorts_by_total_volume() {
        let repo = FakeRepository::sample();
        let report = tokio_test::block_on(analyze_centrals(&repo, None)).unwrap();

        let names: Vec<_> = report.centrals.iter().map(|c| c.central.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Central Sul", "Central Norte", "Central Leste", "Central Oeste"]
        );
        assert_eq!(report.centrals[0].metrics.total_volume, 100.5);
        assert_eq!(report.centrals[1].metrics.total_volume, 30.0);
    }

    #[test]
    fn test_failed_central_is_isolated() {
        let repo = FakeRepository::sample();
        let report = tokio_test::block_on(analyze_centrals(&repo, None)).unwrap();

        assert_eq!(report.failed_count(), 1);
        let failed = report
            .centrals
            .iter()
            .find(|c| c.central.id == 2)
            .unwrap();
        assert!(failed.error.as_deref().unwrap().contains("status 502"));
        assert_eq!(failed.metrics.total_volume, 0.0);
        assert!(failed.metrics.monthly_volumes.is_empty());

        // A central without records is not a failure.
        let empty = report
            .centrals
            .iter()
            .find(|c| c.central.id == 4)
            .unwrap();
        assert!(!empty.is_failed());
        assert_eq!(empty.metrics.post_count, 0);
    }

    #[test]
    fn test_analyze_summary() {
        let repo = FakeRepository::sample();
        let report = tokio_test::block_on(analyze_centrals(&repo, None)).unwrap();

        assert_eq!(report.summary.total_centrals, 4);
        assert_eq!(report.summary.total_volume, 130.5);
        assert_eq!(report.summary.total_posts, 3);
        assert_eq!(report.summary.average_volume_per_central, 32.63);
    }

    #[test]
    fn test_listing_failure_is_fatal() {
        let repo = FakeRepository::failing("cannot connect to host");

        let err = tokio_test::block_on(analyze_centrals(&repo, None)).unwrap_err();
        assert!(matches!(err, AnalyticsError::UpstreamUnavailable { .. }));
    }

    #[test]
    fn test_progress_bar_tracks_centrals() {
        let repo = FakeRepository::sample();
        let pb = ProgressBar::hidden();
        tokio_test::block_on(analyze_centrals(&repo, Some(&pb))).unwrap();

        assert_eq!(pb.length(), Some(4));
        assert_eq!(pb.position(), 4);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary, AnalysisSummary::default());
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut reports = vec![
            CentralReport::failed(&central(1, "A"), "x".to_string()),
            CentralReport::failed(&central(2, "B"), "y".to_string()),
        ];
        sort_by_total_volume(&mut reports);

        assert_eq!(reports[0].central.id, 1);
        assert_eq!(reports[1].central.id, 2);
    }
}
