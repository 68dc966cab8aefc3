//! Tank Telemetry - Logging Infrastructure
//!
//! Structured `tracing` output for the API layer, JSON in deployed
//! environments and human-readable locally.

pub mod tracer;

pub use tracer::{init_tracing, LogFormat, TelemetryConfig};
