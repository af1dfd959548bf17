//! Prescription records as stored on the ledger.

use crate::{pb, PortalError, PortalResult};
use medichain_types::{AadharNumber, HospitalAddress, NonEmptyText};
use serde::{Deserialize, Serialize};

/// A hospital-issued prescription tied to a patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub patient_id: AadharNumber,
    pub diagnosis: String,
    pub medication: String,
    pub dosage: String,
    pub notes: String,
    /// Unix seconds, assigned by the ledger when the record is appended.
    pub timestamp: i64,
    pub hospital: HospitalAddress,
}

/// A validated prescription about to be appended to the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPrescription {
    pub patient_id: AadharNumber,
    pub diagnosis: NonEmptyText,
    pub medication: NonEmptyText,
    pub dosage: NonEmptyText,
    pub notes: String,
}

impl NewPrescription {
    /// Validate raw form input.
    ///
    /// # Errors
    ///
    /// Returns a `PortalError` if the patient id is not an Aadhar number, or if any of
    /// diagnosis, medication or dosage is blank or contains `,` or `:`. Those two characters
    /// delimit the summary line the analytics parse. Notes may be empty.
    pub fn parse(
        patient_id: &str,
        diagnosis: &str,
        medication: &str,
        dosage: &str,
        notes: &str,
    ) -> PortalResult<Self> {
        Ok(Self {
            patient_id: AadharNumber::parse(patient_id)?,
            diagnosis: summary_field("diagnosis", diagnosis)?,
            medication: summary_field("medication", medication)?,
            dosage: summary_field("dosage", dosage)?,
            notes: notes.trim().to_string(),
        })
    }
}

fn summary_field(field: &'static str, value: &str) -> PortalResult<NonEmptyText> {
    let text = NonEmptyText::new(value).map_err(PortalError::empty(field))?;
    if text.as_str().contains([',', ':']) {
        return Err(PortalError::InvalidInput(format!(
            "{field} cannot contain ',' or ':'"
        )));
    }
    Ok(text)
}

impl From<&Prescription> for pb::Prescription {
    fn from(p: &Prescription) -> Self {
        pb::Prescription {
            patient_id: p.patient_id.to_string(),
            diagnosis: p.diagnosis.clone(),
            medication: p.medication.clone(),
            dosage: p.dosage.clone(),
            notes: p.notes.clone(),
            timestamp: p.timestamp,
            hospital: p.hospital.to_string(),
        }
    }
}
