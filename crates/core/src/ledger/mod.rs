//! The ledger boundary.
//!
//! Persistence, ordering, uniqueness and access control all belong to the ledger. The portal only
//! talks to it through [`Ledger`]; every call is a single awaited request with no retry or
//! idempotency layer on top.
//!
//! [`InMemoryLedger`] implements the contract rules in process and is what the binaries run
//! against in development and what the tests use.

mod memory;

pub use memory::InMemoryLedger;

use crate::appointment::{Appointment, AppointmentStatus, NewAppointment};
use crate::error::ErrorKind;
use crate::prescription::{NewPrescription, Prescription};
use async_trait::async_trait;
use medichain_types::{AadharNumber, HospitalAddress};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("hospital {0} is not registered")]
    HospitalNotRegistered(HospitalAddress),
    #[error("hospital {0} is already registered")]
    HospitalAlreadyRegistered(HospitalAddress),
    #[error("appointment {0} not found")]
    AppointmentNotFound(u64),
    #[error("cannot change appointment status from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error("Insufficient health coins (requested {requested}, available {available})")]
    InsufficientHealthCoins { requested: u64, available: u64 },
    #[error("redeem amount must be greater than zero")]
    InvalidAmount,
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::HospitalNotRegistered(_) => ErrorKind::PermissionDenied,
            LedgerError::HospitalAlreadyRegistered(_)
            | LedgerError::InvalidStatusTransition { .. }
            | LedgerError::InsufficientHealthCoins { .. } => ErrorKind::Conflict,
            LedgerError::AppointmentNotFound(_) => ErrorKind::NotFound,
            LedgerError::InvalidAmount => ErrorKind::InvalidInput,
            LedgerError::Unavailable(_) => ErrorKind::Internal,
        }
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Read/write interface of the records contract.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn register_hospital(&self, address: &HospitalAddress) -> LedgerResult<()>;

    async fn is_registered_hospital(&self, address: &HospitalAddress) -> LedgerResult<bool>;

    /// Append a prescription issued by `hospital` and credit the patient's health coins.
    async fn add_prescription(
        &self,
        hospital: &HospitalAddress,
        prescription: NewPrescription,
    ) -> LedgerResult<Prescription>;

    /// All prescriptions for a patient in the order they were added.
    async fn get_prescriptions(&self, patient_id: &AadharNumber) -> LedgerResult<Vec<Prescription>>;

    async fn get_health_coins(&self, patient_id: &AadharNumber) -> LedgerResult<u64>;

    /// Spend `amount` coins and return the remaining balance.
    async fn redeem_health_coins(&self, patient_id: &AadharNumber, amount: u64)
        -> LedgerResult<u64>;

    async fn schedule_appointment(&self, appointment: NewAppointment) -> LedgerResult<Appointment>;

    async fn update_appointment_status(
        &self,
        id: u64,
        status: AppointmentStatus,
    ) -> LedgerResult<Appointment>;

    async fn get_patient_appointments(
        &self,
        patient_id: &AadharNumber,
    ) -> LedgerResult<Vec<Appointment>>;

    async fn get_hospital_appointments(
        &self,
        hospital: &HospitalAddress,
    ) -> LedgerResult<Vec<Appointment>>;
}
