//! Prescription-history analytics.
//!
//! A single pass over a patient's records:
//! - group records by the diagnosis label parsed from each record's notes
//! - compute prescriptions per day over the whole history (at least one day)
//! - classify the trend direction against two fixed rate thresholds
//! - emit one pattern and one recommendation per diagnosis group
//! - raise alerts for vital-sign readings above fixed thresholds
//!
//! Nothing here is cached; callers re-derive metrics from the ledger on every request.

mod alerts;

pub use alerts::{AlertKind, HealthAlert};

use crate::constants::{
    DECREASING_RATE_THRESHOLD, HIGH_SIGNIFICANCE_MIN_EXCLUSIVE, INCREASING_RATE_THRESHOLD,
    SECONDS_PER_DAY,
};
use crate::pb;
use crate::prescription::Prescription;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const METRIC_KIND_PRESCRIPTION: &str = "prescription";
const PATTERN_KIND: &str = "PRESCRIPTION";
const RECOMMENDATION_KIND: &str = "PRESCRIPTION_MANAGEMENT";
const DIAGNOSIS_KEY: &str = "Diagnosis";

// ============================================================================
// Types
// ============================================================================

/// One prescription flattened into the analytics view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthMetric {
    pub kind: String,
    /// Prescriptions carry no numeric reading, so this is always 0.
    pub value: f64,
    /// Unix seconds.
    pub timestamp: i64,
    /// `Medication: .., Dosage: .., Diagnosis: .., Notes: ..`
    pub notes: String,
    pub hospital: String,
}

impl HealthMetric {
    pub fn from_prescription(p: &Prescription) -> Self {
        Self {
            kind: METRIC_KIND_PRESCRIPTION.to_string(),
            value: 0.0,
            timestamp: p.timestamp,
            notes: format!(
                "Medication: {}, Dosage: {}, Diagnosis: {}, Notes: {}",
                p.medication, p.dosage, p.diagnosis, p.notes
            ),
            hospital: p.hospital.to_string(),
        }
    }
}

pub fn metrics_from_prescriptions(prescriptions: &[Prescription]) -> Vec<HealthMetric> {
    prescriptions
        .iter()
        .map(HealthMetric::from_prescription)
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// `rate > 1.0` is increasing, `rate < 0.5` decreasing, anything in between stable.
    pub fn from_rate(rate: f64) -> Self {
        if rate > INCREASING_RATE_THRESHOLD {
            TrendDirection::Increasing
        } else if rate < DECREASING_RATE_THRESHOLD {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    High,
    Medium,
}

impl Level {
    fn for_group_size(count: usize) -> Self {
        if count > HIGH_SIGNIFICANCE_MIN_EXCLUSIVE {
            Level::High
        } else {
            Level::Medium
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::High => "HIGH",
            Level::Medium => "MEDIUM",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    /// e.g. `"0.75 per day"`
    pub rate_of_change: String,
    /// Number of distinct diagnoses.
    pub recent_value: usize,
    pub average_value: String,
}

impl Default for TrendAnalysis {
    fn default() -> Self {
        Self {
            direction: TrendDirection::Stable,
            rate_of_change: "0 per day".to_string(),
            recent_value: 0,
            average_value: "0".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthPattern {
    pub kind: String,
    pub description: String,
    pub significance: Level,
    pub details: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthRecommendation {
    pub kind: String,
    pub priority: Level,
    pub description: String,
    pub details: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthAnalysis {
    pub trend: TrendAnalysis,
    pub patterns: Vec<HealthPattern>,
    pub recommendations: Vec<HealthRecommendation>,
    pub alerts: Vec<HealthAlert>,
}

/// Records sharing one parsed diagnosis label, in input order.
#[derive(Debug)]
pub struct DiagnosisGroup<'a> {
    pub diagnosis: &'a str,
    pub records: Vec<&'a HealthMetric>,
}

// ============================================================================
// Operations
// ============================================================================

/// Extract the diagnosis label from a metric's notes.
///
/// The notes are split on `,`; the first segment keyed `Diagnosis` wins. That segment must
/// contain exactly one `:` and a non-empty value.
pub fn parse_diagnosis_label(notes: &str) -> Option<&str> {
    let segment = notes.split(',').map(str::trim).find(|segment| {
        segment
            .split_once(':')
            .is_some_and(|(key, _)| key.trim() == DIAGNOSIS_KEY)
    })?;

    let mut parts = segment.split(':');
    let (_key, value) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Partition metrics by diagnosis label, keeping first-appearance order of the groups.
///
/// Metrics without a parseable label belong to no group.
pub fn group_by_diagnosis(metrics: &[HealthMetric]) -> Vec<DiagnosisGroup<'_>> {
    let mut groups: Vec<DiagnosisGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for metric in metrics {
        let Some(diagnosis) = parse_diagnosis_label(&metric.notes) else {
            tracing::warn!(
                timestamp = metric.timestamp,
                "skipping record with unparseable diagnosis"
            );
            continue;
        };

        match index.get(diagnosis) {
            Some(&i) => groups[i].records.push(metric),
            None => {
                index.insert(diagnosis, groups.len());
                groups.push(DiagnosisGroup {
                    diagnosis,
                    records: vec![metric],
                });
            }
        }
    }

    groups
}

/// Whole days between the earliest and latest record, rounded up, never less than one.
pub fn day_span(metrics: &[HealthMetric]) -> i64 {
    let (Some(first), Some(last)) = (
        metrics.iter().map(|m| m.timestamp).min(),
        metrics.iter().map(|m| m.timestamp).max(),
    ) else {
        return 1;
    };

    let span = last.saturating_sub(first);
    (span.saturating_add(SECONDS_PER_DAY - 1) / SECONDS_PER_DAY).max(1)
}

/// Analyse a patient's prescription history.
pub fn analyze(metrics: &[HealthMetric]) -> HealthAnalysis {
    if metrics.is_empty() {
        return HealthAnalysis::default();
    }

    let groups = group_by_diagnosis(metrics);
    let days = day_span(metrics);
    let rate = metrics.len() as f64 / days as f64;

    let trend = TrendAnalysis {
        direction: TrendDirection::from_rate(rate),
        rate_of_change: format!("{rate:.2} per day"),
        recent_value: groups.len(),
        average_value: format!("{rate:.2}"),
    };

    let patterns = groups
        .iter()
        .map(|group| {
            let count = group.records.len();
            // Groups are never empty.
            let last_timestamp = group.records.last().map_or(0, |m| m.timestamp);
            HealthPattern {
                kind: PATTERN_KIND.to_string(),
                description: format!("{}: {} prescriptions", group.diagnosis, count),
                significance: Level::for_group_size(count),
                details: format!("Last prescribed on {}", display_date(last_timestamp)),
            }
        })
        .collect();

    let recommendations = groups
        .iter()
        .map(|group| {
            let count = group.records.len();
            HealthRecommendation {
                kind: RECOMMENDATION_KIND.to_string(),
                priority: Level::for_group_size(count),
                description: format!("Monitor {} treatment closely", group.diagnosis),
                details: format!(
                    "You have {} prescriptions over {} days. Average of {:.2} prescriptions per day for this condition.",
                    count,
                    days,
                    count as f64 / days as f64
                ),
            }
        })
        .collect();

    HealthAnalysis {
        trend,
        patterns,
        recommendations,
        alerts: alerts::check_for_alerts(metrics),
    }
}

/// `M/D/YYYY` in UTC.
fn display_date(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

// ============================================================================
// Wire conversion
// ============================================================================

impl From<&HealthAnalysis> for pb::AnalysisRes {
    fn from(analysis: &HealthAnalysis) -> Self {
        pb::AnalysisRes {
            trend: Some(pb::TrendAnalysis {
                direction: analysis.trend.direction.as_str().to_string(),
                rate_of_change: analysis.trend.rate_of_change.clone(),
                recent_value: analysis.trend.recent_value as u64,
                average_value: analysis.trend.average_value.clone(),
            }),
            patterns: analysis
                .patterns
                .iter()
                .map(|p| pb::HealthPattern {
                    kind: p.kind.clone(),
                    description: p.description.clone(),
                    significance: p.significance.as_str().to_string(),
                    details: p.details.clone(),
                })
                .collect(),
            recommendations: analysis
                .recommendations
                .iter()
                .map(|r| pb::HealthRecommendation {
                    kind: r.kind.clone(),
                    priority: r.priority.as_str().to_string(),
                    description: r.description.clone(),
                    details: r.details.clone(),
                })
                .collect(),
            alerts: analysis
                .alerts
                .iter()
                .map(|a| pb::HealthAlert {
                    kind: a.kind.as_str().to_string(),
                    message: a.message.clone(),
                    timestamp: a.timestamp,
                })
                .collect(),
        }
    }
}
