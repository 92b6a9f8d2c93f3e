//! Grant applicant prioritization and fraud-risk scoring.
//!
//! The scoring core lives under [`workflows::grants`]; configuration, telemetry and the
//! top-level error type are shared with the HTTP service in `services/api`.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
