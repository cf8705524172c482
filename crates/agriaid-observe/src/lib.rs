//! Observability setup for AgriAid: structured logging via `tracing`, with
//! optional JSON output and optional OpenTelemetry span export.

pub mod tracing_setup;

pub use tracing_setup::{TracingError, TracingOptions, init_tracing, shutdown_tracing};
