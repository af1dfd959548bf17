//! Vital signs captured alongside a prescription.
//!
//! The ledger has no structured field for vitals, so they travel inside the prescription notes
//! as comma-separated `Label: value` fragments, e.g.
//! `BP: 120/80, Sugar: 110 mg/dL, Temp: 98.6°F, Frequency: daily`.
//! [`crate::analytics`] reads the same fragments back when raising alerts.

use crate::{PortalError, PortalResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub(crate) const BLOOD_PRESSURE_LABEL: &str = "BP";
pub(crate) const BLOOD_SUGAR_LABEL: &str = "Sugar";
pub(crate) const TEMPERATURE_LABEL: &str = "Temp";
pub(crate) const WEIGHT_LABEL: &str = "Weight";
pub(crate) const SYMPTOMS_LABEL: &str = "Symptoms";
pub(crate) const FREQUENCY_LABEL: &str = "Frequency";

pub(crate) const BLOOD_SUGAR_UNIT: &str = "mg/dL";
pub(crate) const TEMPERATURE_UNIT: &str = "°F";
pub(crate) const WEIGHT_UNIT: &str = "kg";

/// How often a medication is taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Daily,
    TwiceDaily,
    Weekly,
    Monthly,
    AsNeeded,
}

impl Frequency {
    /// Parse the form value (`daily`, `twice_daily`, ...). Blank input means `daily`.
    pub fn parse(input: &str) -> PortalResult<Self> {
        match input.trim() {
            "" | "daily" => Ok(Frequency::Daily),
            "twice_daily" => Ok(Frequency::TwiceDaily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "as_needed" => Ok(Frequency::AsNeeded),
            other => Err(PortalError::InvalidInput(format!(
                "unknown frequency: {other}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::TwiceDaily => "twice_daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::AsNeeded => "as_needed",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthDetails {
    pub blood_pressure: Option<String>,
    pub blood_sugar: Option<String>,
    pub temperature: Option<String>,
    pub weight: Option<String>,
    pub symptoms: Option<String>,
    pub frequency: Frequency,
}

impl HealthDetails {
    /// Build from raw form strings; blank strings count as not provided.
    pub fn from_form(
        blood_pressure: &str,
        blood_sugar: &str,
        temperature: &str,
        weight: &str,
        symptoms: &str,
        frequency: &str,
    ) -> PortalResult<Self> {
        fn present(value: &str) -> Option<String> {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }

        Ok(Self {
            blood_pressure: present(blood_pressure),
            blood_sugar: present(blood_sugar),
            temperature: present(temperature),
            weight: present(weight),
            symptoms: present(symptoms),
            frequency: Frequency::parse(frequency)?,
        })
    }

    /// Render the notes string stored with the prescription.
    pub fn format_notes(&self) -> String {
        let mut parts = Vec::with_capacity(6);
        if let Some(bp) = &self.blood_pressure {
            parts.push(format!("{BLOOD_PRESSURE_LABEL}: {bp}"));
        }
        if let Some(sugar) = &self.blood_sugar {
            parts.push(format!("{BLOOD_SUGAR_LABEL}: {sugar} {BLOOD_SUGAR_UNIT}"));
        }
        if let Some(temp) = &self.temperature {
            parts.push(format!("{TEMPERATURE_LABEL}: {temp}{TEMPERATURE_UNIT}"));
        }
        if let Some(weight) = &self.weight {
            parts.push(format!("{WEIGHT_LABEL}: {weight} {WEIGHT_UNIT}"));
        }
        if let Some(symptoms) = &self.symptoms {
            parts.push(format!("{SYMPTOMS_LABEL}: {symptoms}"));
        }
        parts.push(format!("{FREQUENCY_LABEL}: {}", self.frequency));
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_every_field_in_order() {
        let details = HealthDetails::from_form(
            "120/80",
            "110",
            "98.6",
            "72",
            "mild headache",
            "twice_daily",
        )
        .expect("valid form");
        assert_eq!(
            details.format_notes(),
            "BP: 120/80, Sugar: 110 mg/dL, Temp: 98.6°F, Weight: 72 kg, \
             Symptoms: mild headache, Frequency: twice_daily"
        );
    }

    #[test]
    fn blank_fields_are_omitted() {
        let details = HealthDetails::from_form("", "  ", "101", "", "", "").expect("valid form");
        assert_eq!(details.format_notes(), "Temp: 101°F, Frequency: daily");
    }

    #[test]
    fn unknown_frequency_is_rejected() {
        assert!(HealthDetails::from_form("", "", "", "", "", "hourly").is_err());
    }
}
