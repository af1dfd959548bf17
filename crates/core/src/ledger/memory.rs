use super::{Ledger, LedgerError, LedgerResult};
use crate::appointment::{Appointment, AppointmentStatus, NewAppointment};
use crate::constants::HEALTH_COINS_PER_PRESCRIPTION;
use crate::prescription::{NewPrescription, Prescription};
use async_trait::async_trait;
use medichain_types::{AadharNumber, HospitalAddress};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Default)]
struct State {
    hospitals: HashSet<HospitalAddress>,
    prescriptions: HashMap<AadharNumber, Vec<Prescription>>,
    health_coins: HashMap<AadharNumber, u64>,
    // Index is the appointment id.
    appointments: Vec<Appointment>,
}

/// Process-local ledger with the same rules as the records contract.
///
/// Clones share state.
#[derive(Clone)]
pub struct InMemoryLedger {
    state: Arc<RwLock<State>>,
    clock: Clock,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    /// A ledger that stamps records with the current UTC time.
    pub fn new() -> Self {
        Self::with_clock(|| chrono::Utc::now().timestamp())
    }

    /// A ledger that stamps records with `clock()`; used to make timestamps deterministic.
    pub fn with_clock(clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            clock: Arc::new(clock),
        }
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| LedgerError::Unavailable(e.to_string()))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| LedgerError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn register_hospital(&self, address: &HospitalAddress) -> LedgerResult<()> {
        let mut state = self.write()?;
        if !state.hospitals.insert(address.clone()) {
            return Err(LedgerError::HospitalAlreadyRegistered(address.clone()));
        }
        tracing::info!(hospital = %address, "HospitalRegistered");
        Ok(())
    }

    async fn is_registered_hospital(&self, address: &HospitalAddress) -> LedgerResult<bool> {
        Ok(self.read()?.hospitals.contains(address))
    }

    async fn add_prescription(
        &self,
        hospital: &HospitalAddress,
        prescription: NewPrescription,
    ) -> LedgerResult<Prescription> {
        let timestamp = (self.clock)();
        let mut state = self.write()?;
        if !state.hospitals.contains(hospital) {
            return Err(LedgerError::HospitalNotRegistered(hospital.clone()));
        }

        let record = Prescription {
            patient_id: prescription.patient_id,
            diagnosis: prescription.diagnosis.into_string(),
            medication: prescription.medication.into_string(),
            dosage: prescription.dosage.into_string(),
            notes: prescription.notes,
            timestamp,
            hospital: hospital.clone(),
        };

        state
            .prescriptions
            .entry(record.patient_id.clone())
            .or_default()
            .push(record.clone());
        let balance = state
            .health_coins
            .entry(record.patient_id.clone())
            .or_default();
        *balance = balance.saturating_add(HEALTH_COINS_PER_PRESCRIPTION);

        tracing::info!(patient = %record.patient_id, hospital = %hospital, "PrescriptionAdded");
        tracing::info!(
            patient = %record.patient_id,
            amount = HEALTH_COINS_PER_PRESCRIPTION,
            "HealthCoinsAwarded"
        );

        Ok(record)
    }

    async fn get_prescriptions(&self, patient_id: &AadharNumber) -> LedgerResult<Vec<Prescription>> {
        Ok(self
            .read()?
            .prescriptions
            .get(patient_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_health_coins(&self, patient_id: &AadharNumber) -> LedgerResult<u64> {
        Ok(self
            .read()?
            .health_coins
            .get(patient_id)
            .copied()
            .unwrap_or(0))
    }

    async fn redeem_health_coins(
        &self,
        patient_id: &AadharNumber,
        amount: u64,
    ) -> LedgerResult<u64> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let mut state = self.write()?;
        let available = state.health_coins.get(patient_id).copied().unwrap_or(0);
        if available < amount {
            return Err(LedgerError::InsufficientHealthCoins {
                requested: amount,
                available,
            });
        }

        let remaining = available - amount;
        state.health_coins.insert(patient_id.clone(), remaining);
        tracing::info!(patient = %patient_id, amount, "HealthCoinsRedeemed");
        Ok(remaining)
    }

    async fn schedule_appointment(&self, appointment: NewAppointment) -> LedgerResult<Appointment> {
        let mut state = self.write()?;
        if !state.hospitals.contains(&appointment.hospital) {
            return Err(LedgerError::HospitalNotRegistered(appointment.hospital));
        }

        let record = Appointment {
            id: state.appointments.len() as u64,
            patient_id: appointment.patient_id,
            hospital: appointment.hospital,
            timestamp: appointment.timestamp,
            status: AppointmentStatus::Scheduled,
            contact_email: appointment.contact_email,
            contact_phone: appointment.contact_phone,
            notes: appointment.notes,
            department: appointment.department,
        };
        state.appointments.push(record.clone());

        tracing::info!(
            id = record.id,
            patient = %record.patient_id,
            hospital = %record.hospital,
            "AppointmentScheduled"
        );
        Ok(record)
    }

    async fn update_appointment_status(
        &self,
        id: u64,
        status: AppointmentStatus,
    ) -> LedgerResult<Appointment> {
        let mut state = self.write()?;
        let appointment = usize::try_from(id)
            .ok()
            .and_then(|idx| state.appointments.get_mut(idx))
            .ok_or(LedgerError::AppointmentNotFound(id))?;

        if !appointment.status.can_transition_to(status) {
            return Err(LedgerError::InvalidStatusTransition {
                from: appointment.status,
                to: status,
            });
        }

        appointment.status = status;
        tracing::info!(id, status = %status, "AppointmentStatusUpdated");
        Ok(appointment.clone())
    }

    async fn get_patient_appointments(
        &self,
        patient_id: &AadharNumber,
    ) -> LedgerResult<Vec<Appointment>> {
        Ok(self
            .read()?
            .appointments
            .iter()
            .filter(|a| &a.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn get_hospital_appointments(
        &self,
        hospital: &HospitalAddress,
    ) -> LedgerResult<Vec<Appointment>> {
        Ok(self
            .read()?
            .appointments
            .iter()
            .filter(|a| &a.hospital == hospital)
            .cloned()
            .collect())
    }
}
