//! # API REST
//!
//! REST API implementation for MediChain.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialisation, CORS, status codes)
//!
//! Uses `api-shared` for the wire types and `medichain-core` for every operation.

#![warn(rust_2018_idioms)]

mod handlers;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use medichain_core::{ErrorKind, PortalError, PortalService};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::pb;

/// Application state for the REST API server
///
/// Holds the portal service shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub portal: PortalService,
}

impl AppState {
    pub fn new(portal: PortalService) -> Self {
        Self { portal }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::register_hospital,
        handlers::add_prescription,
        handlers::record_health_metrics,
        handlers::get_prescriptions,
        handlers::get_health_coins,
        handlers::redeem_health_coins,
        handlers::analyze_patient,
        handlers::get_patient_appointments,
        handlers::schedule_appointment,
        handlers::update_appointment_status,
        handlers::get_hospital_appointments,
        handlers::ask_advisor,
        handlers::list_store_items,
        handlers::redeem_store_item,
    ),
    components(schemas(
        pb::HealthRes,
        pb::ErrorRes,
        pb::RegisterHospitalReq,
        pb::RegisterHospitalRes,
        pb::Prescription,
        pb::AddPrescriptionReq,
        pb::AddPrescriptionRes,
        pb::RecordHealthMetricsReq,
        pb::GetPrescriptionsRes,
        pb::TrendAnalysis,
        pb::HealthPattern,
        pb::HealthRecommendation,
        pb::HealthAlert,
        pb::AnalysisRes,
        pb::HealthCoinsRes,
        pb::RedeemHealthCoinsReq,
        pb::Appointment,
        pb::ScheduleAppointmentReq,
        pb::UpdateAppointmentStatusReq,
        pb::AppointmentRes,
        pb::AppointmentsRes,
        pb::ChatMessage,
        pb::AdviceReq,
        pb::AdviceRes,
        pb::StoreItem,
        pb::StoreItemsRes,
        pb::RedeemStoreItemReq,
        pb::RedeemStoreItemRes,
    ))
)]
pub struct ApiDoc;

/// Build the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/hospitals", post(handlers::register_hospital))
        .route("/prescriptions", post(handlers::add_prescription))
        .route("/health-metrics", post(handlers::record_health_metrics))
        .route("/patients/:id/prescriptions", get(handlers::get_prescriptions))
        .route("/patients/:id/health-coins", get(handlers::get_health_coins))
        .route(
            "/patients/:id/health-coins/redeem",
            post(handlers::redeem_health_coins),
        )
        .route("/patients/:id/analytics", get(handlers::analyze_patient))
        .route(
            "/patients/:id/appointments",
            get(handlers::get_patient_appointments),
        )
        .route("/appointments", post(handlers::schedule_appointment))
        .route(
            "/appointments/:id/status",
            put(handlers::update_appointment_status),
        )
        .route(
            "/hospitals/:address/appointments",
            get(handlers::get_hospital_appointments),
        )
        .route("/health-advisor", post(handlers::ask_advisor))
        .route("/store/items", get(handlers::list_store_items))
        .route("/store/redeem", post(handlers::redeem_store_item))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub(crate) type ApiError = (StatusCode, Json<pb::ErrorRes>);
pub(crate) type ApiResult<T> = Result<Json<T>, ApiError>;

pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log the detailed error and turn it into the JSON error body.
pub(crate) fn api_error(context: &'static str, err: PortalError) -> ApiError {
    let status = status_for(err.kind());
    if status.is_server_error() {
        tracing::error!("{context} error: {:?}", err);
    } else {
        tracing::warn!("{context} rejected: {}", err);
    }
    (
        status,
        Json(pb::ErrorRes {
            error: err.user_message(),
        }),
    )
}

// ============================================================================
// Extractors
// ============================================================================

/// Request-shape failure reported through the same `{"error": ..}` body as portal errors.
pub(crate) struct BadRequest(pub String);

impl IntoResponse for BadRequest {
    fn into_response(self) -> Response {
        tracing::warn!("Malformed request rejected: {}", self.0);
        (
            StatusCode::BAD_REQUEST,
            Json(pb::ErrorRes { error: self.0 }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for BadRequest {
    fn from(rejection: JsonRejection) -> Self {
        BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for BadRequest {
    fn from(rejection: PathRejection) -> Self {
        BadRequest(rejection.body_text())
    }
}

/// `axum::Json` with rejections mapped to a 400 JSON error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(BadRequest))]
pub(crate) struct ApiJson<T>(pub T);

/// `axum::extract::Path` with rejections mapped to a 400 JSON error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(BadRequest))]
pub(crate) struct ApiPath<T>(pub T);

#[cfg(test)]
mod tests;
