//! REST handlers.
//!
//! Each handler converts the JSON body (or path) into a call on [`PortalService`] and the result
//! back into a `pb` message. Path segments take precedence over the matching body field.
//!
//! [`PortalService`]: medichain_core::PortalService

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};

use crate::{api_error, ApiJson, ApiPath, ApiResult, AppState};
use api_shared::{pb, HealthService};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = pb::HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
pub(crate) async fn health(State(_state): State<AppState>) -> Json<pb::HealthRes> {
    Json(HealthService::check_health())
}

// ============================================================================
// Hospitals
// ============================================================================

#[utoipa::path(
    post,
    path = "/hospitals",
    request_body = pb::RegisterHospitalReq,
    responses(
        (status = 200, description = "Hospital registered", body = pb::RegisterHospitalRes),
        (status = 400, description = "Invalid hospital address", body = pb::ErrorRes),
        (status = 409, description = "Hospital already registered", body = pb::ErrorRes)
    )
)]
/// Register a hospital address so it can issue prescriptions.
#[axum::debug_handler]
pub(crate) async fn register_hospital(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<pb::RegisterHospitalReq>,
) -> ApiResult<pb::RegisterHospitalRes> {
    state
        .portal
        .register_hospital(&req.address)
        .await
        .map_err(|e| api_error("Register hospital", e))?;
    Ok(Json(pb::RegisterHospitalRes { success: true }))
}

// ============================================================================
// Prescriptions
// ============================================================================

#[utoipa::path(
    post,
    path = "/prescriptions",
    request_body = pb::AddPrescriptionReq,
    responses(
        (status = 200, description = "Prescription added", body = pb::AddPrescriptionRes),
        (status = 400, description = "Bad request", body = pb::ErrorRes),
        (status = 403, description = "Hospital not registered", body = pb::ErrorRes),
        (status = 500, description = "Internal server error", body = pb::ErrorRes)
    )
)]
/// Add a prescription and award health coins to the patient.
#[axum::debug_handler]
pub(crate) async fn add_prescription(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<pb::AddPrescriptionReq>,
) -> ApiResult<pb::AddPrescriptionRes> {
    let receipt = state
        .portal
        .add_prescription(req)
        .await
        .map_err(|e| api_error("Add prescription", e))?;
    Ok(Json((&receipt).into()))
}

#[utoipa::path(
    post,
    path = "/health-metrics",
    request_body = pb::RecordHealthMetricsReq,
    responses(
        (status = 200, description = "Health metrics recorded", body = pb::AddPrescriptionRes),
        (status = 400, description = "Bad request", body = pb::ErrorRes),
        (status = 403, description = "Hospital not registered", body = pb::ErrorRes)
    )
)]
/// Add a prescription whose notes record vital signs.
#[axum::debug_handler]
pub(crate) async fn record_health_metrics(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<pb::RecordHealthMetricsReq>,
) -> ApiResult<pb::AddPrescriptionRes> {
    let receipt = state
        .portal
        .record_health_metrics(req)
        .await
        .map_err(|e| api_error("Record health metrics", e))?;
    Ok(Json((&receipt).into()))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/prescriptions",
    params(("id" = String, Path, description = "12-digit Aadhar number")),
    responses(
        (status = 200, description = "Patient prescriptions", body = pb::GetPrescriptionsRes),
        (status = 400, description = "Invalid Aadhar number", body = pb::ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_prescriptions(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<pb::GetPrescriptionsRes> {
    let prescriptions = state
        .portal
        .get_prescriptions(&id)
        .await
        .map_err(|e| api_error("Get prescriptions", e))?;
    Ok(Json(pb::GetPrescriptionsRes {
        prescriptions: prescriptions.iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/analytics",
    params(("id" = String, Path, description = "12-digit Aadhar number")),
    responses(
        (status = 200, description = "Trend, pattern and alert analysis", body = pb::AnalysisRes),
        (status = 400, description = "Invalid Aadhar number", body = pb::ErrorRes)
    )
)]
/// Analyse the patient's prescription history.
#[axum::debug_handler]
pub(crate) async fn analyze_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<pb::AnalysisRes> {
    let analysis = state
        .portal
        .analyze_patient(&id)
        .await
        .map_err(|e| api_error("Analyse patient", e))?;
    Ok(Json((&analysis).into()))
}

// ============================================================================
// Health coins
// ============================================================================

#[utoipa::path(
    get,
    path = "/patients/{id}/health-coins",
    params(("id" = String, Path, description = "12-digit Aadhar number")),
    responses(
        (status = 200, description = "Health coin balance", body = pb::HealthCoinsRes),
        (status = 400, description = "Invalid Aadhar number", body = pb::ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_health_coins(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<pb::HealthCoinsRes> {
    let health_coins = state
        .portal
        .get_health_coins(&id)
        .await
        .map_err(|e| api_error("Get health coins", e))?;
    Ok(Json(pb::HealthCoinsRes {
        patient_id: id,
        health_coins,
    }))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/health-coins/redeem",
    params(("id" = String, Path, description = "12-digit Aadhar number")),
    request_body = pb::RedeemHealthCoinsReq,
    responses(
        (status = 200, description = "Remaining balance", body = pb::HealthCoinsRes),
        (status = 400, description = "Invalid amount", body = pb::ErrorRes),
        (status = 409, description = "Insufficient health coins", body = pb::ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn redeem_health_coins(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(mut req): ApiJson<pb::RedeemHealthCoinsReq>,
) -> ApiResult<pb::HealthCoinsRes> {
    req.patient_id = id;

    let health_coins = state
        .portal
        .redeem_health_coins(&req.patient_id, req.amount)
        .await
        .map_err(|e| api_error("Redeem health coins", e))?;
    Ok(Json(pb::HealthCoinsRes {
        patient_id: req.patient_id,
        health_coins,
    }))
}

// ============================================================================
// Appointments
// ============================================================================

#[utoipa::path(
    get,
    path = "/patients/{id}/appointments",
    params(("id" = String, Path, description = "12-digit Aadhar number")),
    responses(
        (status = 200, description = "Patient appointments", body = pb::AppointmentsRes),
        (status = 400, description = "Invalid Aadhar number", body = pb::ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_patient_appointments(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<pb::AppointmentsRes> {
    let appointments = state
        .portal
        .get_patient_appointments(&id)
        .await
        .map_err(|e| api_error("Get patient appointments", e))?;
    Ok(Json(pb::AppointmentsRes {
        appointments: appointments.iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/appointments",
    request_body = pb::ScheduleAppointmentReq,
    responses(
        (status = 200, description = "Appointment scheduled", body = pb::AppointmentRes),
        (status = 400, description = "Bad request", body = pb::ErrorRes),
        (status = 403, description = "Hospital not registered", body = pb::ErrorRes)
    )
)]
/// Book an appointment; new appointments start as scheduled.
#[axum::debug_handler]
pub(crate) async fn schedule_appointment(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<pb::ScheduleAppointmentReq>,
) -> ApiResult<pb::AppointmentRes> {
    let appointment = state
        .portal
        .schedule_appointment(req)
        .await
        .map_err(|e| api_error("Schedule appointment", e))?;
    Ok(Json(pb::AppointmentRes {
        appointment: Some((&appointment).into()),
    }))
}

#[utoipa::path(
    put,
    path = "/appointments/{id}/status",
    params(("id" = u64, Path, description = "Appointment id")),
    request_body = pb::UpdateAppointmentStatusReq,
    responses(
        (status = 200, description = "Appointment updated", body = pb::AppointmentRes),
        (status = 400, description = "Unknown status", body = pb::ErrorRes),
        (status = 404, description = "Appointment not found", body = pb::ErrorRes),
        (status = 409, description = "Invalid status transition", body = pb::ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn update_appointment_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
    ApiJson(mut req): ApiJson<pb::UpdateAppointmentStatusReq>,
) -> ApiResult<pb::AppointmentRes> {
    req.id = id;

    let appointment = state
        .portal
        .update_appointment_status(req.id, req.status)
        .await
        .map_err(|e| api_error("Update appointment status", e))?;
    Ok(Json(pb::AppointmentRes {
        appointment: Some((&appointment).into()),
    }))
}

#[utoipa::path(
    get,
    path = "/hospitals/{address}/appointments",
    params(("address" = String, Path, description = "Hospital ledger address")),
    responses(
        (status = 200, description = "Hospital appointments", body = pb::AppointmentsRes),
        (status = 400, description = "Invalid hospital address", body = pb::ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_hospital_appointments(
    State(state): State<AppState>,
    ApiPath(address): ApiPath<String>,
) -> ApiResult<pb::AppointmentsRes> {
    let appointments = state
        .portal
        .get_hospital_appointments(&address)
        .await
        .map_err(|e| api_error("Get hospital appointments", e))?;
    Ok(Json(pb::AppointmentsRes {
        appointments: appointments.iter().map(Into::into).collect(),
    }))
}

// ============================================================================
// Health advisor
// ============================================================================

const INVALID_MESSAGES: &str = "Invalid messages format";

#[utoipa::path(
    post,
    path = "/health-advisor",
    request_body = pb::AdviceReq,
    responses(
        (status = 200, description = "Advisor answer", body = pb::AdviceRes),
        (status = 400, description = "Invalid messages format", body = pb::ErrorRes),
        (status = 500, description = "Advisor unavailable", body = pb::ErrorRes)
    )
)]
/// Answer the last user message with general health guidance.
///
/// Any body that does not decode as a message list is answered with `Invalid messages format`.
#[axum::debug_handler]
pub(crate) async fn ask_advisor(
    State(state): State<AppState>,
    payload: Result<Json<pb::AdviceReq>, JsonRejection>,
) -> ApiResult<pb::AdviceRes> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::warn!("Health advisor rejected: {}", rejection.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(pb::ErrorRes {
                error: INVALID_MESSAGES.to_string(),
            }),
        )
    })?;

    let response = state
        .portal
        .ask_advisor(req)
        .await
        .map_err(|e| api_error("Health advisor", e))?;
    Ok(Json(pb::AdviceRes { response }))
}

// ============================================================================
// Store
// ============================================================================

#[utoipa::path(
    get,
    path = "/store/items",
    responses(
        (status = 200, description = "Store catalogue", body = pb::StoreItemsRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn list_store_items(State(state): State<AppState>) -> Json<pb::StoreItemsRes> {
    Json(pb::StoreItemsRes {
        items: state.portal.list_store_items().iter().map(Into::into).collect(),
    })
}

#[utoipa::path(
    post,
    path = "/store/redeem",
    request_body = pb::RedeemStoreItemReq,
    responses(
        (status = 200, description = "Item redeemed", body = pb::RedeemStoreItemRes),
        (status = 404, description = "Store item not found", body = pb::ErrorRes),
        (status = 409, description = "Insufficient health coins", body = pb::ErrorRes)
    )
)]
/// Spend health coins on a store item.
#[axum::debug_handler]
pub(crate) async fn redeem_store_item(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<pb::RedeemStoreItemReq>,
) -> ApiResult<pb::RedeemStoreItemRes> {
    let redemption = state
        .portal
        .redeem_store_item(&req.patient_id, req.item_id)
        .await
        .map_err(|e| api_error("Redeem store item", e))?;
    Ok(Json((&redemption).into()))
}
