//! HTTP surface modules (router, handlers, middleware).

/// Shared constants and header names.
pub mod constants;
/// Problem response helpers and error types.
pub mod errors;
/// Liveness, health, and metrics endpoints.
pub mod health;
/// Report lookup endpoint.
pub mod results;
/// Router construction and server host.
pub mod router;
/// Metrics middleware for HTTP requests.
pub mod telemetry;
/// Contract upload endpoints.
pub mod upload;
