//! # API Shared
//!
//! Shared utilities and definitions for MediChain APIs.
//!
//! Contains:
//! - Protobuf-generated types (`pb` module)
//! - Shared services like `HealthService`
//! - Authentication utilities (usable by both gRPC and REST)
//!
//! Used by `medichain-core`, `api-grpc` and `api-rest` for common functionality.

// The generated code is placed into OUT_DIR at build time by the build script.
pub mod pb {
    tonic::include_proto!("medichain.v1");
}

pub mod auth;
pub mod health;

pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("proto_descriptor");

pub use health::HealthService;
pub use pb::*;
