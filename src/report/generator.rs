//! Markdown report generation.
//!
//! This module renders the analysis of every central as a Markdown report,
//! or as the JSON envelope served by the HTTP endpoint.

use crate::models::{AnalysisReport, AnalysisResponse, AnalysisSummary, CentralReport};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(
    report: &AnalysisReport,
    site_url: &str,
    include_monthly: bool,
) -> String {
    let mut output = String::new();

    output.push_str("# Centrals Volume Report\n\n");

    output.push_str(&generate_metadata_section(report, site_url));
    output.push_str(&generate_summary_section(&report.summary));
    output.push_str(&generate_ranking_section(&report.centrals));
    output.push_str(&generate_centrals_section(&report.centrals, include_monthly));
    output.push_str(&generate_failures_section(&report.centrals));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(report: &AnalysisReport, site_url: &str) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Site:** {}\n", site_url));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Centrals:** {}\n", report.centrals.len()));

    let failed = report.failed_count();
    if failed > 0 {
        section.push_str(&format!("- **Centrals Failed:** {}\n", failed));
    }
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &AnalysisSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Centrals | Total Volume (kg) | Verifications | Average per Central (kg) |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {:.2} | {} | {:.2} |\n\n",
        summary.total_centrals,
        summary.total_volume,
        summary.total_posts,
        summary.average_volume_per_central
    ));

    section
}

/// Generate the ranking table, highest volume first.
fn generate_ranking_section(centrals: &[CentralReport]) -> String {
    let mut section = String::new();

    section.push_str("## Ranking\n\n");

    if centrals.is_empty() {
        section.push_str("No centrals were found.\n\n");
        return section;
    }

    section.push_str(
        "| # | Central | Total (kg) | Verifications | Average (kg) | Monthly Average (kg) | Posts per Month |\n",
    );
    section.push_str("|:---:|:---|:---:|:---:|:---:|:---:|:---:|\n");

    for (i, entry) in centrals.iter().enumerate() {
        let m = &entry.metrics;
        section.push_str(&format!(
            "| {} | {} | {:.2} | {} | {:.2} | {:.2} | {:.2} |\n",
            i + 1,
            entry.central.name,
            m.total_volume,
            m.post_count,
            m.average_volume,
            m.average_monthly_volume,
            m.average_monthly_posts
        ));
    }
    section.push('\n');

    section
}

/// Generate one section per central that has data.
fn generate_centrals_section(centrals: &[CentralReport], include_monthly: bool) -> String {
    let with_data: Vec<_> = centrals
        .iter()
        .filter(|c| !c.is_failed() && c.metrics.post_count > 0)
        .collect();

    if with_data.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Centrals\n\n");

    for entry in with_data {
        section.push_str(&generate_central_block(entry, include_monthly));
    }

    section
}

/// Generate the block of a single central.
fn generate_central_block(entry: &CentralReport, include_monthly: bool) -> String {
    let mut block = String::new();
    let m = &entry.metrics;

    block.push_str(&format!("### {}\n\n", entry.central.name));
    block.push_str(&format!(
        "*Verifications: {} | Total: {:.2} kg | Months: {}*\n\n",
        m.post_count,
        m.total_volume,
        m.monthly_volumes.len()
    ));

    if include_monthly && !m.monthly_volumes.is_empty() {
        block.push_str("| Month | Volume (kg) |\n");
        block.push_str("|:---|:---:|\n");
        for month in &m.monthly_volumes {
            block.push_str(&format!("| {} | {:.2} |\n", month.month, month.volume));
        }
        block.push('\n');
    }

    if !m.quarterly_volumes.is_empty() {
        block.push_str("| Quarter | Volume (kg) |\n");
        block.push_str("|:---|:---:|\n");
        for quarter in &m.quarterly_volumes {
            block.push_str(&format!("| {} | {:.2} |\n", quarter.quarter, quarter.volume));
        }
        block.push('\n');
    }

    if !m.semesterly_volumes.is_empty() {
        block.push_str("| Semester | Volume (kg) |\n");
        block.push_str("|:---|:---:|\n");
        for semester in &m.semesterly_volumes {
            block.push_str(&format!(
                "| {} | {:.2} |\n",
                semester.semester, semester.volume
            ));
        }
        block.push('\n');
    }

    block.push_str("---\n\n");

    block
}

/// Generate the list of centrals that could not be analyzed.
fn generate_failures_section(centrals: &[CentralReport]) -> String {
    let failed: Vec<_> = centrals.iter().filter(|c| c.is_failed()).collect();
    if failed.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Failed Centrals\n\n");
    for entry in failed {
        section.push_str(&format!(
            "- **{}**: {}\n",
            entry.central.name,
            entry.error.as_deref().unwrap_or_default()
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "*Report generated by centrals-analytics*\n".to_string()
}

/// Generate a JSON report in the same envelope the server returns.
pub fn generate_json_report(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(&AnalysisResponse::new(report)).map_err(Into::into)
}

/// Write report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
