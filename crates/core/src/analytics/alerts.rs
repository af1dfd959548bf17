//! Vital-sign alerts read from the fragments written by [`crate::health_details`].

use super::HealthMetric;
use crate::constants::{
    BLOOD_SUGAR_ALERT_MG_DL, DIASTOLIC_ALERT_MMHG, FEVER_ALERT_FAHRENHEIT, SYSTOLIC_ALERT_MMHG,
};
use crate::health_details::{
    BLOOD_PRESSURE_LABEL, BLOOD_SUGAR_LABEL, BLOOD_SUGAR_UNIT, TEMPERATURE_LABEL,
    TEMPERATURE_UNIT,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    HighBloodPressure,
    HighBloodSugar,
    Fever,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::HighBloodPressure => "HIGH_BLOOD_PRESSURE",
            AlertKind::HighBloodSugar => "HIGH_BLOOD_SUGAR",
            AlertKind::Fever => "FEVER",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthAlert {
    pub kind: AlertKind,
    pub message: String,
    /// Timestamp of the record the reading came from.
    pub timestamp: i64,
}

/// Scan every metric's notes for readings at or above the alert thresholds.
///
/// Readings that do not parse are ignored.
pub(crate) fn check_for_alerts(metrics: &[HealthMetric]) -> Vec<HealthAlert> {
    let mut alerts = Vec::new();

    for metric in metrics {
        for fragment in fragments(&metric.notes) {
            if let Some(alert) = check_fragment(fragment) {
                alerts.push(HealthAlert {
                    kind: alert.0,
                    message: alert.1,
                    timestamp: metric.timestamp,
                });
            }
        }
    }

    alerts
}

/// `Label: value` pairs from comma-separated notes.
///
/// The first vital of a record sits behind the `Notes:` key of the summary line
/// (`Notes: BP: 150/95`), so that prefix is peeled off.
fn fragments(notes: &str) -> impl Iterator<Item = (&str, &str)> {
    notes.split(',').filter_map(|segment| {
        let segment = segment.trim();
        let segment = segment
            .strip_prefix("Notes:")
            .map(str::trim)
            .unwrap_or(segment);
        let (label, value) = segment.split_once(':')?;
        Some((label.trim(), value.trim()))
    })
}

fn check_fragment((label, value): (&str, &str)) -> Option<(AlertKind, String)> {
    match label {
        BLOOD_PRESSURE_LABEL => {
            let (systolic, diastolic) = value.split_once('/')?;
            let systolic: u32 = systolic.trim().parse().ok()?;
            let diastolic: u32 = diastolic.trim().parse().ok()?;
            (systolic >= SYSTOLIC_ALERT_MMHG || diastolic >= DIASTOLIC_ALERT_MMHG).then(|| {
                (
                    AlertKind::HighBloodPressure,
                    format!(
                        "Blood pressure {systolic}/{diastolic} is at or above {SYSTOLIC_ALERT_MMHG}/{DIASTOLIC_ALERT_MMHG}"
                    ),
                )
            })
        }
        BLOOD_SUGAR_LABEL => {
            let reading: f64 = value
                .trim_end_matches(BLOOD_SUGAR_UNIT)
                .trim()
                .parse()
                .ok()?;
            (reading >= BLOOD_SUGAR_ALERT_MG_DL).then(|| {
                (
                    AlertKind::HighBloodSugar,
                    format!("Blood sugar {reading} {BLOOD_SUGAR_UNIT} is at or above {BLOOD_SUGAR_ALERT_MG_DL} {BLOOD_SUGAR_UNIT}"),
                )
            })
        }
        TEMPERATURE_LABEL => {
            let reading: f64 = value
                .trim_end_matches(TEMPERATURE_UNIT)
                .trim()
                .parse()
                .ok()?;
            (reading >= FEVER_ALERT_FAHRENHEIT).then(|| {
                (
                    AlertKind::Fever,
                    format!("Temperature {reading}{TEMPERATURE_UNIT} is at or above {FEVER_ALERT_FAHRENHEIT}{TEMPERATURE_UNIT}"),
                )
            })
        }
        _ => None,
    }
}
