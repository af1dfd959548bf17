// Re-export the proto module from the shared `api-shared` crate so callers
// can reference `api_grpc::service::pb`.
pub use api_shared::pb;

use api_shared::auth;
use api_shared::HealthService;
use medichain_core::{ErrorKind, PortalError, PortalService};
use std::sync::Arc;
use tonic::service::Interceptor;
use tonic::{Request, Response, Status};

use api_shared::pb::portal_server::Portal;

/// Authentication interceptor for gRPC requests
///
/// Every call must carry an `x-api-key` metadata header equal to the key configured at startup.
#[derive(Clone)]
pub struct ApiKeyInterceptor {
    expected: Option<Arc<str>>,
}

impl ApiKeyInterceptor {
    pub fn new(expected: Option<&str>) -> Self {
        Self {
            expected: expected.map(Arc::from),
        }
    }
}

impl Interceptor for ApiKeyInterceptor {
    fn call(&mut self, req: Request<()>) -> Result<Request<()>, Status> {
        let api_key = req
            .metadata()
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Status::unauthenticated("Missing x-api-key header"))?;

        auth::validate_api_key(api_key, self.expected.as_deref())?;
        Ok(req)
    }
}

/// Map a portal failure onto a gRPC status carrying the user-facing message.
fn status_from(context: &'static str, err: PortalError) -> Status {
    let message = err.user_message();
    match err.kind() {
        ErrorKind::InvalidInput => Status::invalid_argument(message),
        ErrorKind::NotFound => Status::not_found(message),
        ErrorKind::PermissionDenied => Status::permission_denied(message),
        ErrorKind::Conflict => Status::failed_precondition(message),
        ErrorKind::Internal => {
            tracing::error!("{context} error: {:?}", err);
            Status::internal(message)
        }
    }
}

#[derive(Clone)]
pub struct PortalGrpc {
    portal: PortalService,
}

impl PortalGrpc {
    pub fn new(portal: PortalService) -> Self {
        Self { portal }
    }
}

#[tonic::async_trait]
impl Portal for PortalGrpc {
    async fn health(&self, _req: Request<()>) -> Result<Response<pb::HealthRes>, Status> {
        let health_res = HealthService::check_health();
        Ok(Response::new(health_res))
    }

    async fn register_hospital(
        &self,
        req: Request<pb::RegisterHospitalReq>,
    ) -> Result<Response<pb::RegisterHospitalRes>, Status> {
        let req = req.into_inner();
        self.portal
            .register_hospital(&req.address)
            .await
            .map_err(|e| status_from("Register hospital", e))?;
        Ok(Response::new(pb::RegisterHospitalRes { success: true }))
    }

    async fn add_prescription(
        &self,
        req: Request<pb::AddPrescriptionReq>,
    ) -> Result<Response<pb::AddPrescriptionRes>, Status> {
        let receipt = self
            .portal
            .add_prescription(req.into_inner())
            .await
            .map_err(|e| status_from("Add prescription", e))?;
        Ok(Response::new((&receipt).into()))
    }

    async fn record_health_metrics(
        &self,
        req: Request<pb::RecordHealthMetricsReq>,
    ) -> Result<Response<pb::AddPrescriptionRes>, Status> {
        let receipt = self
            .portal
            .record_health_metrics(req.into_inner())
            .await
            .map_err(|e| status_from("Record health metrics", e))?;
        Ok(Response::new((&receipt).into()))
    }

    async fn get_prescriptions(
        &self,
        req: Request<pb::PatientReq>,
    ) -> Result<Response<pb::GetPrescriptionsRes>, Status> {
        let prescriptions = self
            .portal
            .get_prescriptions(&req.into_inner().patient_id)
            .await
            .map_err(|e| status_from("Get prescriptions", e))?;
        Ok(Response::new(pb::GetPrescriptionsRes {
            prescriptions: prescriptions.iter().map(Into::into).collect(),
        }))
    }

    async fn analyze_patient(
        &self,
        req: Request<pb::PatientReq>,
    ) -> Result<Response<pb::AnalysisRes>, Status> {
        let analysis = self
            .portal
            .analyze_patient(&req.into_inner().patient_id)
            .await
            .map_err(|e| status_from("Analyse patient", e))?;
        Ok(Response::new((&analysis).into()))
    }

    async fn get_health_coins(
        &self,
        req: Request<pb::PatientReq>,
    ) -> Result<Response<pb::HealthCoinsRes>, Status> {
        let patient_id = req.into_inner().patient_id;
        let health_coins = self
            .portal
            .get_health_coins(&patient_id)
            .await
            .map_err(|e| status_from("Get health coins", e))?;
        Ok(Response::new(pb::HealthCoinsRes {
            patient_id,
            health_coins,
        }))
    }

    async fn redeem_health_coins(
        &self,
        req: Request<pb::RedeemHealthCoinsReq>,
    ) -> Result<Response<pb::HealthCoinsRes>, Status> {
        let req = req.into_inner();
        let health_coins = self
            .portal
            .redeem_health_coins(&req.patient_id, req.amount)
            .await
            .map_err(|e| status_from("Redeem health coins", e))?;
        Ok(Response::new(pb::HealthCoinsRes {
            patient_id: req.patient_id,
            health_coins,
        }))
    }

    async fn schedule_appointment(
        &self,
        req: Request<pb::ScheduleAppointmentReq>,
    ) -> Result<Response<pb::AppointmentRes>, Status> {
        let appointment = self
            .portal
            .schedule_appointment(req.into_inner())
            .await
            .map_err(|e| status_from("Schedule appointment", e))?;
        Ok(Response::new(pb::AppointmentRes {
            appointment: Some((&appointment).into()),
        }))
    }

    async fn update_appointment_status(
        &self,
        req: Request<pb::UpdateAppointmentStatusReq>,
    ) -> Result<Response<pb::AppointmentRes>, Status> {
        let req = req.into_inner();
        let appointment = self
            .portal
            .update_appointment_status(req.id, req.status)
            .await
            .map_err(|e| status_from("Update appointment status", e))?;
        Ok(Response::new(pb::AppointmentRes {
            appointment: Some((&appointment).into()),
        }))
    }

    async fn get_patient_appointments(
        &self,
        req: Request<pb::PatientReq>,
    ) -> Result<Response<pb::AppointmentsRes>, Status> {
        let appointments = self
            .portal
            .get_patient_appointments(&req.into_inner().patient_id)
            .await
            .map_err(|e| status_from("Get patient appointments", e))?;
        Ok(Response::new(pb::AppointmentsRes {
            appointments: appointments.iter().map(Into::into).collect(),
        }))
    }

    async fn get_hospital_appointments(
        &self,
        req: Request<pb::HospitalReq>,
    ) -> Result<Response<pb::AppointmentsRes>, Status> {
        let appointments = self
            .portal
            .get_hospital_appointments(&req.into_inner().hospital)
            .await
            .map_err(|e| status_from("Get hospital appointments", e))?;
        Ok(Response::new(pb::AppointmentsRes {
            appointments: appointments.iter().map(Into::into).collect(),
        }))
    }

    async fn ask_advisor(
        &self,
        req: Request<pb::AdviceReq>,
    ) -> Result<Response<pb::AdviceRes>, Status> {
        let response = self
            .portal
            .ask_advisor(req.into_inner())
            .await
            .map_err(|e| status_from("Health advisor", e))?;
        Ok(Response::new(pb::AdviceRes { response }))
    }

    async fn list_store_items(
        &self,
        _req: Request<()>,
    ) -> Result<Response<pb::StoreItemsRes>, Status> {
        Ok(Response::new(pb::StoreItemsRes {
            items: self.portal.list_store_items().iter().map(Into::into).collect(),
        }))
    }

    async fn redeem_store_item(
        &self,
        req: Request<pb::RedeemStoreItemReq>,
    ) -> Result<Response<pb::RedeemStoreItemRes>, Status> {
        let req = req.into_inner();
        let redemption = self
            .portal
            .redeem_store_item(&req.patient_id, req.item_id)
            .await
            .map_err(|e| status_from("Redeem store item", e))?;
        Ok(Response::new((&redemption).into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medichain_core::{HealthAdvisor, InMemoryLedger};
    use tonic::Code;

    const HOSPITAL: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
    const PATIENT: &str = "123456789012";

    fn service() -> PortalGrpc {
        PortalGrpc::new(PortalService::new(
            Arc::new(InMemoryLedger::new()),
            HealthAdvisor::disabled(),
        ))
    }

    async fn registered() -> PortalGrpc {
        let svc = service();
        svc.register_hospital(Request::new(pb::RegisterHospitalReq {
            address: HOSPITAL.into(),
        }))
        .await
        .expect("register");
        svc
    }

    fn keyed<T>(message: T, key: &str) -> Request<T> {
        let mut req = Request::new(message);
        req.metadata_mut()
            .insert("x-api-key", key.parse().expect("metadata value"));
        req
    }

    #[test]
    fn interceptor_requires_matching_key() {
        let mut interceptor = ApiKeyInterceptor::new(Some("secret"));
        assert!(interceptor.call(keyed((), "secret")).is_ok());

        let status = interceptor.call(keyed((), "guess")).expect_err("wrong key");
        assert_eq!(status.code(), Code::Unauthenticated);

        let status = interceptor.call(Request::new(())).expect_err("no header");
        assert_eq!(status.code(), Code::Unauthenticated);
    }

    #[test]
    fn interceptor_without_configured_key_is_internal() {
        let mut interceptor = ApiKeyInterceptor::new(None);
        let status = interceptor.call(keyed((), "secret")).expect_err("no key configured");
        assert_eq!(status.code(), Code::Internal);
    }

    #[tokio::test]
    async fn prescription_and_balance() {
        let svc = registered().await;
        let res = svc
            .add_prescription(Request::new(pb::AddPrescriptionReq {
                hospital: HOSPITAL.into(),
                patient_id: PATIENT.into(),
                diagnosis: "Migraine".into(),
                medication: "Sumatriptan".into(),
                dosage: "50mg".into(),
                notes: String::new(),
            }))
            .await
            .expect("add")
            .into_inner();
        assert_eq!(res.health_coins, 10);

        let coins = svc
            .get_health_coins(Request::new(pb::PatientReq {
                patient_id: PATIENT.into(),
            }))
            .await
            .expect("coins")
            .into_inner();
        assert_eq!(coins.health_coins, 10);
        assert_eq!(coins.patient_id, PATIENT);
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let svc = registered().await;

        let status = svc
            .get_prescriptions(Request::new(pb::PatientReq {
                patient_id: "abc".into(),
            }))
            .await
            .expect_err("invalid id");
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = svc
            .register_hospital(Request::new(pb::RegisterHospitalReq {
                address: HOSPITAL.into(),
            }))
            .await
            .expect_err("duplicate");
        assert_eq!(status.code(), Code::FailedPrecondition);

        let status = svc
            .update_appointment_status(Request::new(pb::UpdateAppointmentStatusReq {
                id: 3,
                status: pb::AppointmentStatus::Confirmed as i32,
            }))
            .await
            .expect_err("missing appointment");
        assert_eq!(status.code(), Code::NotFound);

        let status = svc
            .redeem_store_item(Request::new(pb::RedeemStoreItemReq {
                patient_id: PATIENT.into(),
                item_id: 1,
            }))
            .await
            .expect_err("no coins");
        assert_eq!(status.code(), Code::FailedPrecondition);
        assert_eq!(status.message(), "Insufficient health coins");
    }

    #[tokio::test]
    async fn unregistered_hospital_is_permission_denied() {
        let status = service()
            .schedule_appointment(Request::new(pb::ScheduleAppointmentReq {
                patient_id: PATIENT.into(),
                hospital: HOSPITAL.into(),
                timestamp: 1_700_000_000,
                contact_email: "patient@example.com".into(),
                contact_phone: "9876543210".into(),
                ..Default::default()
            }))
            .await
            .expect_err("unregistered");
        assert_eq!(status.code(), Code::PermissionDenied);
    }

    #[tokio::test]
    async fn disabled_advisor_is_internal_with_generic_message() {
        let status = service()
            .ask_advisor(Request::new(pb::AdviceReq {
                messages: vec![pb::ChatMessage {
                    role: "user".into(),
                    content: "hello".into(),
                }],
            }))
            .await
            .expect_err("disabled");
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(
            status.message(),
            "An error occurred while processing your request. Please try again."
        );
    }

    #[tokio::test]
    async fn store_catalogue_is_listed() {
        let items = service()
            .list_store_items(Request::new(()))
            .await
            .expect("items")
            .into_inner()
            .items;
        assert_eq!(items.len(), 12);
        assert_eq!(items[0].name, "Premium Health Checkup");
    }
}
