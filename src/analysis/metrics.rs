//! Per-central volume metrics.
//!
//! Turns the raw volume verification posts of one central into totals,
//! averages and monthly/quarterly/semesterly series. Records with an
//! unusable volume or date are dropped here and never reach the sums.

use crate::analysis::buckets::{MonthKey, MonthRange, QuarterKey, SemesterKey};
use crate::error::AnalyticsError;
use crate::models::{
    Central, CentralInfo, CentralMetrics, CentralReport, MonthlyVolume, QuarterlyVolume,
    SemesterlyVolume, VolumeRecord,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Naive timestamp layouts WordPress and its clients send.
const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parse a raw volume into a usable magnitude.
///
/// Returns `None` for anything that is not a finite, strictly positive
/// number. Strings are read up to the end of their leading numeric prefix,
/// so `"12.5 kg"` yields `12.5`.
pub fn parse_volume(raw: Option<&Value>) -> Option<f64> {
    let value = match raw? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    }?;

    (value.is_finite() && value > 0.0).then_some(value)
}

/// Longest leading float literal of `raw`, after leading whitespace.
fn parse_float_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    if end < len && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < len && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < len && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < len && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < len && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        // A dangling "e" is not part of the number.
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Parse a post date into its calendar day.
///
/// RFC 3339 timestamps keep the wall-clock date of their own offset; naive
/// timestamps and plain dates are taken as written.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Convert a raw JSON payload into volume records.
///
/// The payload must be an array. Items that do not look like records are
/// kept as empty records so they are excluded downstream.
pub fn parse_records(payload: Value) -> Result<Vec<VolumeRecord>, AnalyticsError> {
    let items = match payload {
        Value::Array(items) => items,
        other => {
            return Err(AnalyticsError::InvalidInput(format!(
                "expected an array of volume records, got {}",
                json_kind(&other)
            )))
        }
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).unwrap_or_else(|e| {
                debug!("Record #{} has an unexpected shape: {}", index, e);
                VolumeRecord::default()
            })
        })
        .collect();

    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A record that survived filtering.
#[derive(Debug, Clone, Copy)]
struct ValidRecord {
    month: MonthKey,
    volume: f64,
}

fn validate(record: &VolumeRecord) -> Option<ValidRecord> {
    let Some(volume) = parse_volume(record.raw_volume()) else {
        debug!("Skipping record {:?}: no usable volume", record.id);
        return None;
    };

    let Some(date) = record.date.as_deref().and_then(parse_record_date) else {
        debug!(
            "Skipping record {:?}: unparseable date {:?}",
            record.id, record.date
        );
        return None;
    };

    Some(ValidRecord {
        month: MonthKey::from_date(date),
        volume,
    })
}

/// Compute the metrics of one central from its volume records.
///
/// Never fails: malformed records are excluded. With no valid record every
/// figure is zero and every series is empty.
pub fn compute_metrics(central: &Central, records: &[VolumeRecord]) -> CentralReport {
    let info = CentralInfo::from(central);
    let valid: Vec<ValidRecord> = records.iter().filter_map(validate).collect();

    let (Some(start), Some(end)) = (
        valid.iter().map(|r| r.month).min(),
        valid.iter().map(|r| r.month).max(),
    ) else {
        debug!("Central {}: no valid volume records", info.name);
        return CentralReport {
            central: info,
            metrics: CentralMetrics::default(),
            error: None,
        };
    };

    let mut monthly: BTreeMap<MonthKey, f64> =
        MonthRange(start, end).map(|month| (month, 0.0)).collect();
    let mut quarterly: BTreeMap<QuarterKey, f64> = BTreeMap::new();
    let mut semesterly: BTreeMap<SemesterKey, f64> = BTreeMap::new();

    for record in &valid {
        *monthly.entry(record.month).or_insert(0.0) += record.volume;
        *quarterly.entry(record.month.quarter()).or_insert(0.0) += record.volume;
        *semesterly.entry(record.month.semester()).or_insert(0.0) += record.volume;
    }

    let post_count = valid.len();
    let total_volume: f64 = valid.iter().map(|r| r.volume).sum();
    let average_volume = total_volume / post_count as f64;

    let month_count = monthly.len();
    let average_monthly_volume = monthly.values().sum::<f64>() / month_count as f64;
    let average_monthly_posts = post_count as f64 / month_count as f64;

    let has_data = monthly.values().any(|v| *v > 0.0);
    info!(
        "Central {}: {} months, {}",
        info.name,
        month_count,
        if has_data { "with data" } else { "without data" }
    );

    let metrics = CentralMetrics {
        total_volume: round2(total_volume),
        average_volume: round2(average_volume),
        post_count,
        average_monthly_volume: round2(average_monthly_volume),
        average_monthly_posts: round2(average_monthly_posts),
        monthly_volumes: monthly
            .into_iter()
            .map(|(month, volume)| MonthlyVolume {
                month: month.to_string(),
                volume: round2(volume),
            })
            .collect(),
        quarterly_volumes: quarterly
            .into_iter()
            .map(|(quarter, volume)| QuarterlyVolume {
                quarter: quarter.to_string(),
                volume: round2(volume),
            })
            .collect(),
        semesterly_volumes: semesterly
            .into_iter()
            .map(|(semester, volume)| SemesterlyVolume {
                semester: semester.to_string(),
                volume: round2(volume),
            })
            .collect(),
    };

    CentralReport {
        central: info,
        metrics,
        error: None,
    }
}
