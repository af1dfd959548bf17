//! # MediChain Core
//!
//! Core business logic for the MediChain patient and hospital portal.
//!
//! This crate contains the domain operations behind both APIs:
//! - Prescription records, health-coin balances and appointment bookings via the [`Ledger`] seam
//! - Trend, pattern and alert analysis over a patient's prescription history
//! - The health advisor backed by a hosted text-generation endpoint
//! - The health-coin storefront catalogue
//!
//! **No API concerns**: Authentication, HTTP/gRPC servers, or service interfaces belong in `api-grpc`, `api-rest`, or `api-shared`.

pub mod advisor;
pub mod analytics;
pub mod appointment;
pub mod config;
pub mod constants;
pub mod error;
pub mod health_details;
pub mod ledger;
pub mod portal;
pub mod prescription;
pub mod store;

// Use the shared api-shared crate for generated protobuf types.
pub use api_shared::pb;

pub use advisor::{AdvisorError, ChatMessage, ChatRole, HealthAdvisor, HuggingFaceClient, TextGenerator};
pub use analytics::{HealthAnalysis, HealthMetric, TrendDirection};
pub use appointment::{Appointment, AppointmentStatus, Department, NewAppointment};
pub use config::{CoreConfig, InferenceConfig};
pub use error::{ErrorKind, PortalError, PortalResult};
pub use ledger::{InMemoryLedger, Ledger, LedgerError};
pub use portal::{PortalService, PrescriptionReceipt, StoreRedemption};
pub use prescription::{NewPrescription, Prescription};
pub use store::StoreItem;
