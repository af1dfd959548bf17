//! Appointments and their status progression.
//!
//! Status values on the wire match the ledger enum: `Scheduled = 0`, `Confirmed = 1`,
//! `Cancelled = 2`, `Completed = 3`. A scheduled visit can be confirmed or cancelled, a
//! confirmed one can be completed or cancelled, and cancelled/completed visits are final.

use crate::constants::DEPARTMENTS;
use crate::{pb, PortalError, PortalResult};
use medichain_types::{AadharNumber, ContactEmail, ContactPhone, HospitalAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Whether an appointment in this status may move to `next`.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Scheduled, Confirmed)
                | (Scheduled, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }

    /// Cancelled and completed appointments accept no further updates.
    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Completed)
    }

    pub fn to_wire(self) -> i32 {
        match self {
            AppointmentStatus::Scheduled => pb::AppointmentStatus::Scheduled as i32,
            AppointmentStatus::Confirmed => pb::AppointmentStatus::Confirmed as i32,
            AppointmentStatus::Cancelled => pb::AppointmentStatus::Cancelled as i32,
            AppointmentStatus::Completed => pb::AppointmentStatus::Completed as i32,
        }
    }

    /// Decode the ledger/wire integer.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::InvalidInput` for values outside `0..=3`.
    pub fn from_wire(value: i32) -> PortalResult<Self> {
        match value {
            0 => Ok(AppointmentStatus::Scheduled),
            1 => Ok(AppointmentStatus::Confirmed),
            2 => Ok(AppointmentStatus::Cancelled),
            3 => Ok(AppointmentStatus::Completed),
            other => Err(PortalError::InvalidInput(format!(
                "unknown appointment status {other}"
            ))),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Completed => "Completed",
        };
        f.write_str(label)
    }
}

/// One of the clinical departments listed in [`DEPARTMENTS`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Department(&'static str);

impl Department {
    /// Match a department name case-insensitively. Blank input selects `General`.
    pub fn parse(input: &str) -> PortalResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self(DEPARTMENTS[0]));
        }
        DEPARTMENTS
            .iter()
            .find(|d| d.eq_ignore_ascii_case(trimmed))
            .map(|d| Self(*d))
            .ok_or_else(|| PortalError::InvalidInput(format!("unknown department: {trimmed}")))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl TryFrom<String> for Department {
    type Error = PortalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Department::parse(&value)
    }
}

// Equivalent to `#[serde(try_from = "String")]`; the derive would bound `'de: 'static` because of
// the `&'static str` field.
impl<'de> Deserialize<'de> for Department {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Department::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl From<Department> for String {
    fn from(value: Department) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: u64,
    pub patient_id: AadharNumber,
    pub hospital: HospitalAddress,
    /// Scheduled visit time, unix seconds.
    pub timestamp: i64,
    pub status: AppointmentStatus,
    pub contact_email: ContactEmail,
    pub contact_phone: ContactPhone,
    pub notes: String,
    pub department: Department,
}

/// A validated booking request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAppointment {
    pub patient_id: AadharNumber,
    pub hospital: HospitalAddress,
    pub timestamp: i64,
    pub contact_email: ContactEmail,
    pub contact_phone: ContactPhone,
    pub notes: String,
    pub department: Department,
}

impl NewAppointment {
    /// Validate raw booking input.
    ///
    /// Checks run in form order (patient, email, phone) so the first problem reported matches
    /// what the booking form shows.
    #[allow(clippy::too_many_arguments)]
    pub fn parse(
        patient_id: &str,
        hospital: &str,
        timestamp: i64,
        contact_email: &str,
        contact_phone: &str,
        notes: &str,
        department: &str,
    ) -> PortalResult<Self> {
        let patient_id = AadharNumber::parse(patient_id)?;
        let contact_email = ContactEmail::parse(contact_email)?;
        let contact_phone = ContactPhone::parse(contact_phone)?;
        let hospital = HospitalAddress::parse(hospital)?;
        if timestamp <= 0 {
            return Err(PortalError::InvalidInput(
                "appointment time must be a positive unix timestamp".into(),
            ));
        }

        Ok(Self {
            patient_id,
            hospital,
            timestamp,
            contact_email,
            contact_phone,
            notes: notes.trim().to_string(),
            department: Department::parse(department)?,
        })
    }
}

impl From<&Appointment> for pb::Appointment {
    fn from(a: &Appointment) -> Self {
        pb::Appointment {
            id: a.id,
            patient_id: a.patient_id.to_string(),
            hospital: a.hospital.to_string(),
            timestamp: a.timestamp,
            status: a.status.to_wire(),
            contact_email: a.contact_email.to_string(),
            contact_phone: a.contact_phone.to_string(),
            notes: a.notes.clone(),
            department: a.department.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    const HOSPITAL: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

    #[test]
    fn status_progression() {
        assert!(Scheduled.can_transition_to(Confirmed));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Scheduled.can_transition_to(Completed));
        assert!(!Scheduled.can_transition_to(Scheduled));
        assert!(!Confirmed.can_transition_to(Scheduled));
        for terminal in [Cancelled, Completed] {
            assert!(terminal.is_terminal());
            for next in [Scheduled, Confirmed, Cancelled, Completed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn wire_values_match_ledger_enum() {
        for (status, wire) in [(Scheduled, 0), (Confirmed, 1), (Cancelled, 2), (Completed, 3)] {
            assert_eq!(status.to_wire(), wire);
            assert_eq!(AppointmentStatus::from_wire(wire).expect("known"), status);
        }
        assert!(AppointmentStatus::from_wire(4).is_err());
        assert!(AppointmentStatus::from_wire(-1).is_err());
    }

    #[test]
    fn department_is_matched_case_insensitively() {
        assert_eq!(Department::parse("cardiology").expect("known").as_str(), "Cardiology");
        assert_eq!(Department::parse("").expect("default").as_str(), "General");
        assert!(Department::parse("Astrology").is_err());
    }

    #[test]
    fn booking_reports_first_invalid_field() {
        let err = NewAppointment::parse(
            "123456789012",
            HOSPITAL,
            1_700_000_000,
            "not-an-email",
            "123",
            "",
            "ENT",
        )
        .expect_err("bad email");
        assert_eq!(err.user_message(), "Please enter a valid email address");
    }

    #[test]
    fn booking_rejects_non_positive_time() {
        let err = NewAppointment::parse(
            "123456789012",
            HOSPITAL,
            0,
            "p@example.com",
            "9876543210",
            "",
            "ENT",
        )
        .expect_err("zero timestamp");
        assert!(matches!(err, PortalError::InvalidInput(_)));
    }
}
