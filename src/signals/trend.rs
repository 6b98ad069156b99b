//! Yearly reporting trends based on rolling z-statistics.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::data::openfda::ReportCount;

/// Yearly report counts for one reaction term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReactionTrend {
    pub reaction: String,
    /// (year, reports) ascending by year.
    pub years: Vec<(i32, u64)>,
    /// Latest year against the mean and spread of the earlier years.
    pub latest_z: f64,
}

impl ReactionTrend {
    pub fn from_daily_counts(reaction: impl Into<String>, daily: &[ReportCount]) -> Self {
        let years: Vec<(i32, u64)> = yearly_totals(daily).into_iter().collect();
        let latest_z = rolling_z(&years);
        Self {
            reaction: reaction.into(),
            years,
            latest_z,
        }
    }

    pub fn total(&self) -> u64 {
        self.years.iter().map(|(_, count)| count).sum()
    }
}

/// Sum `receivedate` buckets (`YYYYMMDD`) per calendar year. Buckets with an
/// unparseable date are skipped.
pub fn yearly_totals(daily: &[ReportCount]) -> BTreeMap<i32, u64> {
    let mut totals = BTreeMap::new();
    for bucket in daily {
        match parse_day(&bucket.term) {
            Some(day) => *totals.entry(day.year()).or_insert(0) += bucket.count,
            None => debug!(term = %bucket.term, "skipping undated bucket"),
        }
    }
    totals
}

/// Compute a z-score of the latest value against all earlier values.
pub fn rolling_z(values: &[(i32, u64)]) -> f64 {
    if values.len() < 3 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by_key(|(year, _)| *year);
    let counts: Vec<f64> = sorted.iter().map(|(_, count)| *count as f64).collect();
    let history = &counts[..counts.len() - 1];
    let mean = history.iter().sum::<f64>() / history.len() as f64;
    let variance = history
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / history.len() as f64;
    if variance <= 1e-9 {
        return 0.0;
    }
    let latest = counts.last().copied().unwrap_or(mean);
    (latest - mean) / variance.sqrt()
}

/// Parse an OpenFDA date bucket like `20040102`.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d").ok()
}
