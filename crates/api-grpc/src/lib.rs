//! # API gRPC
//!
//! gRPC server implementation for MediChain.
//!
//! Handles:
//! - gRPC service setup and authentication
//! - Service implementations using `medichain-core` for every operation
//! - gRPC-specific concerns (interceptors, status codes, tonic integration)
//!
//! Uses `api-shared` for common types and utilities.

#![warn(rust_2018_idioms)]

pub use service::{pb, ApiKeyInterceptor, PortalGrpc};

pub mod service;

/// Whether gRPC server reflection should be served, from `MEDICHAIN_ENABLE_REFLECTION`.
///
/// Only the exact value `true` enables it.
pub fn reflection_from_env_value(value: Option<String>) -> bool {
    value.as_deref().map(str::trim) == Some("true")
}
