//! Portal service.
//!
//! This module provides the service both API crates call. Each operation validates the raw
//! request strings into typed identifiers, performs one ledger (or inference) call and maps
//! failures into [`PortalError`].

use crate::advisor::{ChatMessage, ChatRole, HealthAdvisor};
use crate::analytics::{self, HealthAnalysis};
use crate::appointment::{Appointment, AppointmentStatus, NewAppointment};
use crate::health_details::HealthDetails;
use crate::ledger::{Ledger, LedgerError};
use crate::prescription::{NewPrescription, Prescription};
use crate::store::{self, StoreItem};
use crate::{pb, CoreConfig, PortalError, PortalResult};
use medichain_types::{AadharNumber, HospitalAddress};
use std::sync::Arc;

/// A prescription as appended, with the patient's coin balance afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrescriptionReceipt {
    pub prescription: Prescription,
    pub health_coins: u64,
}

impl From<&PrescriptionReceipt> for pb::AddPrescriptionRes {
    fn from(receipt: &PrescriptionReceipt) -> Self {
        pb::AddPrescriptionRes {
            prescription: Some((&receipt.prescription).into()),
            health_coins: receipt.health_coins,
        }
    }
}

/// A store item bought with health coins, with the balance left afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreRedemption {
    pub item: &'static StoreItem,
    pub remaining_coins: u64,
}

impl From<&StoreRedemption> for pb::RedeemStoreItemRes {
    fn from(redemption: &StoreRedemption) -> Self {
        pb::RedeemStoreItemRes {
            item: Some(redemption.item.into()),
            remaining_coins: redemption.remaining_coins,
        }
    }
}

/// Portal operations - no API concerns
#[derive(Clone)]
pub struct PortalService {
    ledger: Arc<dyn Ledger>,
    advisor: HealthAdvisor,
}

impl PortalService {
    pub fn new(ledger: Arc<dyn Ledger>, advisor: HealthAdvisor) -> Self {
        Self { ledger, advisor }
    }

    /// Build the service from startup configuration.
    ///
    /// Registers the configured seed hospitals (already-registered ones are skipped) and enables
    /// the health advisor when an inference key is present.
    ///
    /// # Errors
    ///
    /// Returns a `PortalError` if a seed hospital cannot be registered for any other reason.
    pub async fn bootstrap(cfg: &CoreConfig, ledger: Arc<dyn Ledger>) -> PortalResult<Self> {
        for hospital in cfg.seed_hospitals() {
            match ledger.register_hospital(hospital).await {
                Ok(()) | Err(LedgerError::HospitalAlreadyRegistered(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        tracing::info!(
            hospitals = cfg.seed_hospitals().len(),
            "seed hospitals registered"
        );

        Ok(Self::new(ledger, HealthAdvisor::from_config(cfg.inference())))
    }

    // ------------------------------------------------------------------------
    // Hospitals
    // ------------------------------------------------------------------------

    pub async fn register_hospital(&self, address: &str) -> PortalResult<HospitalAddress> {
        let address = HospitalAddress::parse(address)?;
        self.ledger.register_hospital(&address).await?;
        Ok(address)
    }

    // ------------------------------------------------------------------------
    // Prescriptions
    // ------------------------------------------------------------------------

    pub async fn add_prescription(
        &self,
        req: pb::AddPrescriptionReq,
    ) -> PortalResult<PrescriptionReceipt> {
        let hospital = HospitalAddress::parse(&req.hospital)?;
        let prescription = NewPrescription::parse(
            &req.patient_id,
            &req.diagnosis,
            &req.medication,
            &req.dosage,
            &req.notes,
        )?;
        self.append(&hospital, prescription).await
    }

    /// Add a prescription whose notes carry the vital signs from the health-metrics form.
    pub async fn record_health_metrics(
        &self,
        req: pb::RecordHealthMetricsReq,
    ) -> PortalResult<PrescriptionReceipt> {
        let hospital = HospitalAddress::parse(&req.hospital)?;
        let details = HealthDetails::from_form(
            &req.blood_pressure,
            &req.blood_sugar,
            &req.temperature,
            &req.weight,
            &req.symptoms,
            &req.frequency,
        )?;
        let prescription = NewPrescription::parse(
            &req.patient_id,
            &req.diagnosis,
            &req.medication,
            &req.dosage,
            &details.format_notes(),
        )?;
        self.append(&hospital, prescription).await
    }

    async fn append(
        &self,
        hospital: &HospitalAddress,
        prescription: NewPrescription,
    ) -> PortalResult<PrescriptionReceipt> {
        let prescription = self.ledger.add_prescription(hospital, prescription).await?;
        let health_coins = self
            .ledger
            .get_health_coins(&prescription.patient_id)
            .await?;
        Ok(PrescriptionReceipt {
            prescription,
            health_coins,
        })
    }

    pub async fn get_prescriptions(&self, patient_id: &str) -> PortalResult<Vec<Prescription>> {
        let patient_id = AadharNumber::parse(patient_id)?;
        Ok(self.ledger.get_prescriptions(&patient_id).await?)
    }

    /// Fetch a patient's prescriptions and run the analytics pass over them.
    pub async fn analyze_patient(&self, patient_id: &str) -> PortalResult<HealthAnalysis> {
        let prescriptions = self.get_prescriptions(patient_id).await?;
        let metrics = analytics::metrics_from_prescriptions(&prescriptions);
        Ok(analytics::analyze(&metrics))
    }

    // ------------------------------------------------------------------------
    // Health coins
    // ------------------------------------------------------------------------

    pub async fn get_health_coins(&self, patient_id: &str) -> PortalResult<u64> {
        let patient_id = AadharNumber::parse(patient_id)?;
        Ok(self.ledger.get_health_coins(&patient_id).await?)
    }

    /// Spend coins and return the remaining balance.
    pub async fn redeem_health_coins(&self, patient_id: &str, amount: u64) -> PortalResult<u64> {
        let patient_id = AadharNumber::parse(patient_id)?;
        Ok(self.ledger.redeem_health_coins(&patient_id, amount).await?)
    }

    // ------------------------------------------------------------------------
    // Appointments
    // ------------------------------------------------------------------------

    pub async fn schedule_appointment(
        &self,
        req: pb::ScheduleAppointmentReq,
    ) -> PortalResult<Appointment> {
        let appointment = NewAppointment::parse(
            &req.patient_id,
            &req.hospital,
            req.timestamp,
            &req.contact_email,
            &req.contact_phone,
            &req.notes,
            &req.department,
        )?;
        Ok(self.ledger.schedule_appointment(appointment).await?)
    }

    /// `status` is the wire value (`0..=3`).
    pub async fn update_appointment_status(
        &self,
        id: u64,
        status: i32,
    ) -> PortalResult<Appointment> {
        let status = AppointmentStatus::from_wire(status)?;
        Ok(self.ledger.update_appointment_status(id, status).await?)
    }

    pub async fn get_patient_appointments(
        &self,
        patient_id: &str,
    ) -> PortalResult<Vec<Appointment>> {
        let patient_id = AadharNumber::parse(patient_id)?;
        Ok(self.ledger.get_patient_appointments(&patient_id).await?)
    }

    pub async fn get_hospital_appointments(
        &self,
        hospital: &str,
    ) -> PortalResult<Vec<Appointment>> {
        let hospital = HospitalAddress::parse(hospital)?;
        Ok(self.ledger.get_hospital_appointments(&hospital).await?)
    }

    // ------------------------------------------------------------------------
    // Health advisor
    // ------------------------------------------------------------------------

    pub async fn ask_advisor(&self, req: pb::AdviceReq) -> PortalResult<String> {
        let messages = req
            .messages
            .into_iter()
            .map(|m| {
                Ok(ChatMessage {
                    role: ChatRole::parse(&m.role)?,
                    content: m.content,
                })
            })
            .collect::<Result<Vec<_>, crate::advisor::AdvisorError>>()?;
        Ok(self.advisor.ask(&messages).await?)
    }

    // ------------------------------------------------------------------------
    // Store
    // ------------------------------------------------------------------------

    pub fn list_store_items(&self) -> &'static [StoreItem] {
        store::catalogue()
    }

    pub async fn redeem_store_item(
        &self,
        patient_id: &str,
        item_id: u64,
    ) -> PortalResult<StoreRedemption> {
        let patient_id = AadharNumber::parse(patient_id)?;
        let item = store::find(item_id).ok_or(PortalError::StoreItemNotFound(item_id))?;

        let available = self.ledger.get_health_coins(&patient_id).await?;
        if available < item.coins_required {
            return Err(PortalError::InsufficientHealthCoins {
                required: item.coins_required,
                available,
            });
        }

        let remaining_coins = self
            .ledger
            .redeem_health_coins(&patient_id, item.coins_required)
            .await?;
        tracing::info!(patient = %patient_id, item = item.id, "store item redeemed");
        Ok(StoreRedemption {
            item,
            remaining_coins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::{AdvisorError, TextGenerator};
    use crate::constants::HEALTH_COINS_PER_PRESCRIPTION;
    use crate::error::ErrorKind;
    use crate::ledger::InMemoryLedger;
    use async_trait::async_trait;

    const HOSPITAL: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
    const PATIENT: &str = "123456789012";

    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, _prompt: &str) -> Result<String, AdvisorError> {
            Ok("See a doctor if symptoms persist.".into())
        }
    }

    async fn service() -> PortalService {
        let svc = PortalService::new(Arc::new(InMemoryLedger::new()), HealthAdvisor::new(Arc::new(Echo)));
        svc.register_hospital(HOSPITAL).await.expect("register");
        svc
    }

    fn prescription_req(diagnosis: &str) -> pb::AddPrescriptionReq {
        pb::AddPrescriptionReq {
            hospital: HOSPITAL.into(),
            patient_id: PATIENT.into(),
            diagnosis: diagnosis.into(),
            medication: "Paracetamol".into(),
            dosage: "500mg".into(),
            notes: String::new(),
        }
    }

    fn booking_req() -> pb::ScheduleAppointmentReq {
        pb::ScheduleAppointmentReq {
            patient_id: PATIENT.into(),
            hospital: HOSPITAL.into(),
            timestamp: 1_700_000_000,
            contact_email: "patient@example.com".into(),
            contact_phone: "9876543210".into(),
            notes: String::new(),
            department: "Cardiology".into(),
        }
    }

    #[tokio::test]
    async fn bootstrap_registers_seed_hospitals_once() {
        let ledger = Arc::new(InMemoryLedger::new());
        let cfg = CoreConfig::new(
            None,
            Default::default(),
            vec![HospitalAddress::parse(HOSPITAL).expect("address")],
        );
        PortalService::bootstrap(&cfg, ledger.clone())
            .await
            .expect("first bootstrap");
        // A restart against the same ledger must not fail.
        let svc = PortalService::bootstrap(&cfg, ledger)
            .await
            .expect("second bootstrap");
        let receipt = svc
            .add_prescription(prescription_req("Flu"))
            .await
            .expect("seeded hospital can prescribe");
        assert_eq!(receipt.health_coins, HEALTH_COINS_PER_PRESCRIPTION);
    }

    #[tokio::test]
    async fn add_prescription_reports_balance() {
        let svc = service().await;
        svc.add_prescription(prescription_req("Flu")).await.expect("add");
        let receipt = svc
            .add_prescription(prescription_req("Asthma"))
            .await
            .expect("add");
        assert_eq!(receipt.prescription.diagnosis, "Asthma");
        assert_eq!(receipt.health_coins, 2 * HEALTH_COINS_PER_PRESCRIPTION);
        assert_eq!(svc.get_prescriptions(PATIENT).await.expect("read").len(), 2);
    }

    #[tokio::test]
    async fn unregistered_hospital_is_permission_denied() {
        let svc = service().await;
        let mut req = prescription_req("Flu");
        req.hospital = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512".into();
        let err = svc.add_prescription(req).await.expect_err("unregistered");
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn invalid_patient_id_never_reaches_the_ledger() {
        let svc = service().await;
        let err = svc.get_prescriptions("12345").await.expect_err("short id");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.user_message(), "Please enter a valid 12-digit Aadhar number");
    }

    #[tokio::test]
    async fn health_metrics_are_stored_in_notes_and_raise_alerts() {
        let svc = service().await;
        let receipt = svc
            .record_health_metrics(pb::RecordHealthMetricsReq {
                hospital: HOSPITAL.into(),
                patient_id: PATIENT.into(),
                diagnosis: "Hypertension".into(),
                medication: "Amlodipine".into(),
                dosage: "5mg".into(),
                frequency: "daily".into(),
                blood_pressure: "160/100".into(),
                ..Default::default()
            })
            .await
            .expect("record");
        assert_eq!(receipt.prescription.notes, "BP: 160/100, Frequency: daily");

        let analysis = svc.analyze_patient(PATIENT).await.expect("analyze");
        assert_eq!(analysis.patterns.len(), 1);
        assert_eq!(analysis.patterns[0].description, "Hypertension: 1 prescriptions");
        assert_eq!(analysis.alerts.len(), 1);
    }

    #[tokio::test]
    async fn analysis_of_unknown_patient_is_default() {
        let svc = service().await;
        let analysis = svc.analyze_patient(PATIENT).await.expect("analyze");
        assert_eq!(analysis, HealthAnalysis::default());
    }

    #[tokio::test]
    async fn appointment_lifecycle() {
        let svc = service().await;
        let appt = svc.schedule_appointment(booking_req()).await.expect("schedule");
        assert_eq!(appt.department.as_str(), "Cardiology");

        let confirmed = svc
            .update_appointment_status(appt.id, AppointmentStatus::Confirmed.to_wire())
            .await
            .expect("confirm");
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

        let err = svc
            .update_appointment_status(appt.id, 9)
            .await
            .expect_err("unknown status");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = svc
            .update_appointment_status(appt.id, AppointmentStatus::Scheduled.to_wire())
            .await
            .expect_err("backwards");
        assert_eq!(err.kind(), ErrorKind::Conflict);

        assert_eq!(svc.get_patient_appointments(PATIENT).await.expect("read").len(), 1);
        assert_eq!(svc.get_hospital_appointments(HOSPITAL).await.expect("read").len(), 1);
    }

    #[tokio::test]
    async fn advisor_converts_wire_messages() {
        let svc = service().await;
        let answer = svc
            .ask_advisor(pb::AdviceReq {
                messages: vec![pb::ChatMessage {
                    role: "user".into(),
                    content: "I have a headache".into(),
                }],
            })
            .await
            .expect("answer");
        assert_eq!(answer, "See a doctor if symptoms persist.");

        let err = svc
            .ask_advisor(pb::AdviceReq {
                messages: vec![pb::ChatMessage {
                    role: "system".into(),
                    content: "x".into(),
                }],
            })
            .await
            .expect_err("bad role");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn store_redemption_checks_balance_first() {
        let svc = service().await;
        for _ in 0..5 {
            svc.add_prescription(prescription_req("Flu")).await.expect("add");
        }
        // 50 coins: enough for the pharmacy card (50), not for the checkup (150).
        let err = svc.redeem_store_item(PATIENT, 1).await.expect_err("too expensive");
        assert!(matches!(
            err,
            PortalError::InsufficientHealthCoins {
                required: 150,
                available: 50
            }
        ));

        let redemption = svc.redeem_store_item(PATIENT, 4).await.expect("redeem");
        assert_eq!(redemption.item.name, "Pharmacy Discount Card");
        assert_eq!(redemption.remaining_coins, 0);

        let err = svc.redeem_store_item(PATIENT, 99).await.expect_err("no item");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn redeem_zero_coins_is_invalid() {
        let svc = service().await;
        let err = svc.redeem_health_coins(PATIENT, 0).await.expect_err("zero");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
