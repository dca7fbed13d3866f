//! Observability setup for AgentHub: tracing subscriber with optional
//! OpenTelemetry export.

pub mod tracing_setup;
